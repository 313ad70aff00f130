use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")
}

fn database_error(err: &anyhow::Error) -> Option<&dyn sqlx::error::DatabaseError> {
    match err.downcast_ref::<sqlx::Error>()? {
        sqlx::Error::Database(db_err) => Some(db_err.as_ref()),
        _ => None,
    }
}

/// Name of the unique constraint a failed write tripped, if that is why it failed.
pub fn unique_violation(err: &anyhow::Error) -> Option<&str> {
    let db_err = database_error(err)?;
    if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
        db_err.constraint()
    } else {
        None
    }
}

pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    database_error(err)
        .and_then(|e| e.code())
        .map(|code| code == FOREIGN_KEY_VIOLATION)
        .unwrap_or(false)
}
