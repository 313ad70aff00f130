use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::repo_types::User;
use crate::{
    auth::{dto::Credentials, password::hash_password},
    db,
    error::{AppError, AppResult, FieldErrors},
};

const USERNAME_TAKEN: &str = "That username is taken. Please choose a different one.";
const EMAIL_TAKEN: &str = "That email is already registered.";

/// Rejects a username/email pair that collides with another account.
pub async fn ensure_available(
    db: &PgPool,
    creds: &Credentials,
    except: Option<Uuid>,
) -> AppResult<()> {
    let (username_taken, email_taken) =
        User::taken_fields(db, &creds.username, &creds.email, except).await?;
    let mut fields = FieldErrors::new();
    if username_taken {
        fields.insert("username".into(), vec![USERNAME_TAKEN.into()]);
    }
    if email_taken {
        fields.insert("email".into(), vec![EMAIL_TAKEN.into()]);
    }
    if fields.is_empty() {
        Ok(())
    } else {
        warn!(username = %creds.username, email = %creds.email, "username or email taken");
        Err(AppError::Validation(fields))
    }
}

/// A write that raced past `ensure_available` still hits the unique indexes.
pub fn map_write_error(err: anyhow::Error) -> AppError {
    match db::unique_violation(&err) {
        Some("users_username_key") => AppError::field("username", USERNAME_TAKEN),
        Some("users_email_key") => AppError::field("email", EMAIL_TAKEN),
        _ => AppError::Internal(err),
    }
}

pub async fn create_user(db: &PgPool, creds: &Credentials) -> AppResult<User> {
    ensure_available(db, creds, None).await?;
    let hash = hash_password(&creds.password)?;
    User::create(db, &creds.username, &creds.email, &hash)
        .await
        .map_err(map_write_error)
}

/// Full replace of a user's profile, including a freshly hashed password.
pub async fn replace_user(db: &PgPool, id: Uuid, creds: &Credentials) -> AppResult<User> {
    if User::find_by_id(db, id).await?.is_none() {
        return Err(AppError::not_found("User not found."));
    }
    ensure_available(db, creds, Some(id)).await?;
    let hash = hash_password(&creds.password)?;
    User::update(db, id, &creds.username, &creds.email, &hash)
        .await
        .map_err(map_write_error)?
        .ok_or_else(|| AppError::not_found("User not found."))
}
