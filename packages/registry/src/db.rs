use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::RegistryConfig;
use crate::error::Result;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn create_pool(config: &RegistryConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}

/// Connect, retrying while the database is still starting up.
pub async fn connect_with_retry(
    config: &RegistryConfig,
    attempts: u32,
    interval: Duration,
) -> Result<PgPool> {
    let mut attempt = 1;
    loop {
        match create_pool(config).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < attempts => {
                tracing::warn!(attempt, error = %e, "failed to connect, retrying...");
                tokio::time::sleep(interval).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Apply the ledger and record migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("registry migrations applied");
    Ok(())
}
