pub mod allocation;
pub mod audit;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registrations;
pub mod users;

pub use allocation::{allocate, import_numbers, preview_next_number, NumberedRecord};
pub use audit::{audit_numbers, NumberAudit};
pub use config::{RegistryConfig, RetryPolicy};
pub use db::{connect_with_retry, create_pool, run_migrations};
pub use error::RegistryError;
pub use models::{NewRegistration, NewUser, RecordKind, Registration, User};
