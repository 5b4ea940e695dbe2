use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("registration number error: {0}")]
    Regnum(#[from] ihu_regnum::RegnumError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registration number still taken after {attempts} attempts")]
    AllocationConflict { attempts: u32 },

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("registration not found: {0}")]
    RegistrationNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(uuid::Uuid),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
