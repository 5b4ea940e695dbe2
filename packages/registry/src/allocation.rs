//! Conflict-safe allocation of registration numbers.
//!
//! [`ihu_regnum`] only computes the next number from a snapshot; two writers
//! with the same snapshot compute the same number. Here each attempt runs in
//! one transaction:
//!
//! 1. take the allocation advisory lock, held until commit or rollback
//! 2. read every number in the `registration_numbers` ledger
//! 3. compute the next number from that set
//! 4. insert it into the ledger, then insert the owning record
//! 5. commit
//!
//! The lock queues allocators behind each other, so each one reads a snapshot
//! that already contains its predecessor's number. Writers that bypass the
//! lock (imports, manual inserts) can still race an allocator; the ledger's
//! primary key then makes the allocator fail at step 4, and that attempt is
//! rolled back and retried from a fresh snapshot after a backoff.

use async_trait::async_trait;
use ihu_regnum::{classify, next_registration_number, IdentifierClass, RegistrationNumber};
use sqlx::{PgConnection, PgPool};

use crate::config::RetryPolicy;
use crate::error::{RegistryError, Result};
use crate::models::{IssuedNumber, RecordKind};

const LEDGER_KEY: &str = "registration_numbers_pkey";

/// Key of the transaction-scoped advisory lock that serializes allocations.
const ALLOCATION_LOCK: i64 = 0x4948_5552_4547; // "IHUREG"

/// A record that is stored under a freshly allocated registration number.
#[async_trait]
pub trait NumberedRecord: Send + Sync {
    type Output: Send;

    const KIND: RecordKind;

    /// Checked once, before any database work.
    fn validate(&self) -> Result<()>;

    /// Insert the record inside the allocating transaction.
    async fn insert(
        &self,
        conn: &mut PgConnection,
        number: &RegistrationNumber,
    ) -> Result<Self::Output>;
}

enum AttemptError {
    Conflict(RegistrationNumber),
    Failed(RegistryError),
}

impl From<sqlx::Error> for AttemptError {
    fn from(e: sqlx::Error) -> Self {
        Self::Failed(e.into())
    }
}

impl From<ihu_regnum::RegnumError> for AttemptError {
    fn from(e: ihu_regnum::RegnumError) -> Self {
        Self::Failed(e.into())
    }
}

impl From<RegistryError> for AttemptError {
    fn from(e: RegistryError) -> Self {
        Self::Failed(e)
    }
}

/// Allocate the next number for `year` and store `record` under it.
///
/// Retries on ledger conflicts according to `policy`. Any other failure,
/// including sequence overflow and duplicate emails, is returned immediately.
#[tracing::instrument(skip(pool, policy, record), fields(kind = %R::KIND))]
pub async fn allocate<R: NumberedRecord>(
    pool: &PgPool,
    policy: &RetryPolicy,
    year: i32,
    record: &R,
) -> Result<R::Output> {
    record.validate()?;

    let mut attempt = 1;
    loop {
        match try_allocate(pool, year, record).await {
            Ok(output) => return Ok(output),
            Err(AttemptError::Failed(e)) => return Err(e),
            Err(AttemptError::Conflict(number)) if attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                tracing::debug!(%number, attempt, ?delay, "registration number taken concurrently, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(AttemptError::Conflict(number)) => {
                tracing::warn!(%number, attempts = attempt, "giving up on registration number allocation");
                return Err(RegistryError::AllocationConflict { attempts: attempt });
            }
        }
    }
}

async fn try_allocate<R: NumberedRecord>(
    pool: &PgPool,
    year: i32,
    record: &R,
) -> std::result::Result<R::Output, AttemptError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ALLOCATION_LOCK)
        .execute(&mut *tx)
        .await?;

    let issued = issued_numbers(&mut *tx).await?;
    let number = next_registration_number(year, &issued)?;

    let inserted = sqlx::query("INSERT INTO registration_numbers (number, kind) VALUES ($1, $2)")
        .bind(number.to_string())
        .bind(R::KIND)
        .execute(&mut *tx)
        .await;
    if let Err(e) = inserted {
        if unique_violation(&e) == Some(LEDGER_KEY) {
            return Err(AttemptError::Conflict(number));
        }
        return Err(e.into());
    }

    let output = record.insert(&mut *tx, &number).await?;
    tx.commit().await?;

    tracing::info!(%number, kind = %R::KIND, "registration number issued");
    Ok(output)
}

/// Every identifier in the ledger, in no particular order.
pub async fn issued_numbers<'e, E>(executor: E) -> Result<Vec<String>>
where
    E: sqlx::PgExecutor<'e>,
{
    let numbers = sqlx::query_scalar::<_, String>("SELECT number FROM registration_numbers")
        .fetch_all(executor)
        .await?;
    Ok(numbers)
}

pub async fn list_issued_numbers<'e, E>(executor: E) -> Result<Vec<IssuedNumber>>
where
    E: sqlx::PgExecutor<'e>,
{
    let numbers = sqlx::query_as::<_, IssuedNumber>(
        "SELECT * FROM registration_numbers ORDER BY issued_at ASC, number ASC",
    )
    .fetch_all(executor)
    .await?;
    Ok(numbers)
}

/// The number the next allocation for `year` would get right now. Nothing is
/// reserved.
pub async fn preview_next_number<'e, E>(executor: E, year: i32) -> Result<RegistrationNumber>
where
    E: sqlx::PgExecutor<'e>,
{
    let issued = issued_numbers(executor).await?;
    Ok(next_registration_number(year, &issued)?)
}

/// Record historical numbers in the ledger so new allocations never collide
/// with them. Numbers already present are skipped.
///
/// Returns how many numbers were new.
#[tracing::instrument(skip(pool, numbers), fields(count = numbers.len()))]
pub async fn import_numbers(pool: &PgPool, kind: RecordKind, numbers: &[String]) -> Result<u64> {
    let numbers: Vec<String> = numbers
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();

    let mut legacy = 0usize;
    for number in &numbers {
        match classify(number) {
            IdentifierClass::Current(_) => {}
            IdentifierClass::Legacy => legacy += 1,
            IdentifierClass::Foreign => {
                return Err(RegistryError::InvalidInput(format!(
                    "not a registration number: '{number}'"
                )));
            }
        }
    }

    let result = sqlx::query(
        r#"
        INSERT INTO registration_numbers (number, kind)
        SELECT n, $2::record_kind FROM unnest($1::text[]) AS n
        ON CONFLICT (number) DO NOTHING
        "#,
    )
    .bind(&numbers)
    .bind(kind)
    .execute(pool)
    .await?;

    let imported = result.rows_affected();
    tracing::info!(imported, legacy, %kind, "imported registration numbers");
    Ok(imported)
}

/// Name of the violated unique constraint, if `err` is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => db.constraint(),
        _ => None,
    }
}
