//! Server-side sessions. The client only ever holds the random token; the
//! database stores its SHA-256 digest.

use anyhow::Context;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::config::SessionConfig;

const TOKEN_BYTES: usize = 32;

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// The session token presented by the client: the session cookie first, then a bearer header.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

pub fn session_cookie(cfg: &SessionConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cfg.cookie_name,
        token,
        cfg.ttl_minutes * 60
    );
    if cfg.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie(cfg: &SessionConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        cfg.cookie_name
    )
}

/// A live session joined with the owner's username.
#[derive(Debug, Clone, FromRow)]
pub struct SessionUser {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
}

pub async fn create(db: &PgPool, user_id: Uuid, token: &str, ttl_minutes: i64) -> anyhow::Result<Uuid> {
    let expires_at = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO sessions (user_id, token_hash, expires_at)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(hash_token(token))
    .bind(expires_at)
    .fetch_one(db)
    .await
    .context("insert session")?;
    Ok(id)
}

pub async fn find_user(db: &PgPool, token: &str) -> anyhow::Result<Option<SessionUser>> {
    sqlx::query_as::<_, SessionUser>(
        r#"
        SELECT s.id AS session_id, u.id AS user_id, u.username
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > now()
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(db)
    .await
    .context("find session")
}

pub async fn delete(db: &PgPool, session_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(db)
        .await
        .context("delete session")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn cfg(secure: bool) -> SessionConfig {
        SessionConfig {
            cookie_name: "tiffin_session".into(),
            ttl_minutes: 10,
            cookie_secure: secure,
        }
    }

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_stable_and_hides_the_token() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
        assert_eq!(hash_token(&token).len(), 64);
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; tiffin_session=abc123; lang=en"),
        );
        assert_eq!(
            token_from_headers(&headers, "tiffin_session").as_deref(),
            Some("abc123")
        );
        assert_eq!(token_from_headers(&headers, "other"), None);
    }

    #[test]
    fn falls_back_to_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(
            token_from_headers(&headers, "tiffin_session").as_deref(),
            Some("xyz")
        );

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(token_from_headers(&headers, "tiffin_session"), None);
    }

    #[test]
    fn empty_cookie_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tiffin_session="));
        assert_eq!(token_from_headers(&headers, "tiffin_session"), None);
    }

    #[test]
    fn cookie_attributes() {
        let set = session_cookie(&cfg(false), "tok");
        assert_eq!(
            set,
            "tiffin_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=600"
        );
        assert!(session_cookie(&cfg(true), "tok").ends_with("; Secure"));
        assert!(clear_cookie(&cfg(false)).contains("Max-Age=0"));
    }
}
