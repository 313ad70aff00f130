use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::User;

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")
    }

    /// Find a user by (already normalised) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(db)
        .await
        .context("list users")
    }

    /// Which of `username` / `email` already belong to someone other than `except`.
    pub async fn taken_fields(
        db: &PgPool,
        username: &str,
        email: &str,
        except: Option<Uuid>,
    ) -> anyhow::Result<(bool, bool)> {
        let row: (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM users WHERE username = $1 AND id IS DISTINCT FROM $3),
                EXISTS(SELECT 1 FROM users WHERE email = $2 AND id IS DISTINCT FROM $3)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(except)
        .fetch_one(db)
        .await
        .context("check taken username/email")?;
        Ok(row)
    }

    /// Create a new user with a hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .context("insert user")
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4
            WHERE id = $1
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .context("update user")
    }

    /// Sessions, owned meals and consumption records go with the user (ON DELETE CASCADE).
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }
}
