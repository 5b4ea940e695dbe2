use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegistryError, Result};

/// Which kind of record a ledger entry belongs to. Both kinds draw from the
/// same numbering series.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[sqlx(type_name = "record_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordKind {
    Registration,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssuedNumber {
    pub number: String,
    pub kind: RecordKind,
    pub issued_at: DateTime<Utc>,
}

/// A student registration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub registration_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user account created from the admin back-office.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub registration_number: String,
    pub full_name: String,
    pub email: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewRegistration {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
}

impl NewRegistration {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            course: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.full_name, &self.email)
    }
}

pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub created_by: String,
}

impl NewUser {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            created_by: "admin".to_string(),
        }
    }

    pub fn created_by(mut self, admin: impl Into<String>) -> Self {
        self.created_by = admin.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_contact(&self.full_name, &self.email)?;
        if self.created_by.trim().is_empty() {
            return Err(RegistryError::InvalidInput("created_by is empty".into()));
        }
        Ok(())
    }
}

fn validate_contact(full_name: &str, email: &str) -> Result<()> {
    if full_name.trim().is_empty() {
        return Err(RegistryError::InvalidInput("full name is empty".into()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(RegistryError::InvalidInput(format!(
            "invalid email address: '{email}'"
        ))),
    }
}
