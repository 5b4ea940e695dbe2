use async_trait::async_trait;
use ihu_regnum::RegistrationNumber;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::allocation::{allocate, unique_violation, NumberedRecord};
use crate::config::RetryPolicy;
use crate::error::{RegistryError, Result};
use crate::models::{NewRegistration, RecordKind, Registration};

const EMAIL_KEY: &str = "registrations_email_key";

#[async_trait]
impl NumberedRecord for NewRegistration {
    type Output = Registration;

    const KIND: RecordKind = RecordKind::Registration;

    fn validate(&self) -> Result<()> {
        NewRegistration::validate(self)
    }

    async fn insert(
        &self,
        conn: &mut PgConnection,
        number: &RegistrationNumber,
    ) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(
            r#"
            INSERT INTO registrations (id, registration_number, full_name, email, phone, course)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number.to_string())
        .bind(self.full_name.trim())
        .bind(&self.email)
        .bind(&self.phone)
        .bind(&self.course)
        .fetch_one(conn)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(EMAIL_KEY) => RegistryError::DuplicateEmail(self.email.clone()),
            _ => e.into(),
        })
    }
}

/// Register a student under the next registration number for `year`.
#[tracing::instrument(skip(pool, policy, req), fields(email = %req.email))]
pub async fn create_registration(
    pool: &PgPool,
    policy: &RetryPolicy,
    year: i32,
    req: NewRegistration,
) -> Result<Registration> {
    let registration = allocate(pool, policy, year, &req).await?;
    tracing::info!(
        id = %registration.id,
        number = %registration.registration_number,
        "registration created"
    );
    Ok(registration)
}

pub async fn get_registration<'e, E>(executor: E, id: Uuid) -> Result<Registration>
where
    E: sqlx::PgExecutor<'e>,
{
    let registration =
        sqlx::query_as::<_, Registration>(r#"SELECT * FROM registrations WHERE id = $1"#)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| RegistryError::RegistrationNotFound(id.to_string()))?;

    Ok(registration)
}

pub async fn find_registration_by_number<'e, E>(
    executor: E,
    number: &str,
) -> Result<Registration>
where
    E: sqlx::PgExecutor<'e>,
{
    let registration = sqlx::query_as::<_, Registration>(
        r#"SELECT * FROM registrations WHERE registration_number = $1"#,
    )
    .bind(number)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| RegistryError::RegistrationNotFound(number.to_string()))?;

    Ok(registration)
}

/// List registrations, newest first.
pub async fn list_registrations<'e, E>(executor: E) -> Result<Vec<Registration>>
where
    E: sqlx::PgExecutor<'e>,
{
    let registrations = sqlx::query_as::<_, Registration>(
        r#"SELECT * FROM registrations ORDER BY created_at DESC, registration_number DESC"#,
    )
    .fetch_all(executor)
    .await?;

    Ok(registrations)
}
