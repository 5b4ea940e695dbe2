use async_trait::async_trait;
use ihu_regnum::RegistrationNumber;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::allocation::{allocate, unique_violation, NumberedRecord};
use crate::config::RetryPolicy;
use crate::error::{RegistryError, Result};
use crate::models::{NewUser, RecordKind, User};

const EMAIL_KEY: &str = "users_email_key";

#[async_trait]
impl NumberedRecord for NewUser {
    type Output = User;

    const KIND: RecordKind = RecordKind::User;

    fn validate(&self) -> Result<()> {
        NewUser::validate(self)
    }

    async fn insert(&self, conn: &mut PgConnection, number: &RegistrationNumber) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, registration_number, full_name, email, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number.to_string())
        .bind(self.full_name.trim())
        .bind(&self.email)
        .bind(&self.created_by)
        .fetch_one(conn)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(EMAIL_KEY) => RegistryError::DuplicateEmail(self.email.clone()),
            _ => e.into(),
        })
    }
}

/// Create a user from the admin back-office. Users share the registration
/// number series with student registrations.
#[tracing::instrument(skip(pool, policy, req), fields(email = %req.email, created_by = %req.created_by))]
pub async fn create_user(
    pool: &PgPool,
    policy: &RetryPolicy,
    year: i32,
    req: NewUser,
) -> Result<User> {
    let user = allocate(pool, policy, year, &req).await?;
    tracing::info!(id = %user.id, number = %user.registration_number, "user created");
    Ok(user)
}

pub async fn get_user<'e, E>(executor: E, id: Uuid) -> Result<User>
where
    E: sqlx::PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(RegistryError::UserNotFound(id))?;

    Ok(user)
}

pub async fn list_users<'e, E>(executor: E) -> Result<Vec<User>>
where
    E: sqlx::PgExecutor<'e>,
{
    let users = sqlx::query_as::<_, User>(
        r#"SELECT * FROM users ORDER BY created_at DESC, registration_number DESC"#,
    )
    .fetch_all(executor)
    .await?;

    Ok(users)
}
