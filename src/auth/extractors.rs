use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;
use uuid::Uuid;

use super::session;
use crate::{error::AppError, state::AppState};

/// The authenticated caller for this request, resolved from its session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub session_id: Uuid,
}

/// `Some` when the request carries a live session; never rejects for a missing one.
pub struct MaybeAuthUser(pub Option<AuthUser>);

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(token) = session::token_from_headers(&parts.headers, &state.config.session.cookie_name)
    else {
        return Ok(None);
    };
    let found = session::find_user(&state.db, &token).await?;
    if found.is_none() {
        debug!("session token unknown or expired");
    }
    Ok(found.map(|s| AuthUser {
        id: s.user_id,
        username: s.username,
        session_id: s.session_id,
    }))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .ok_or_else(|| AppError::unauthorized("Please log in to access this page."))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve(parts, state).await?))
    }
}
