use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{LoginForm, MessageResponse, RegisterForm},
    extractors::{AuthUser, MaybeAuthUser},
    services, session,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::services::create_user,
    validation::ValidatedJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

fn set_cookie(value: String) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid cookie header: {e}")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

#[instrument(skip(state, current, form))]
pub async fn register(
    State(state): State<AppState>,
    MaybeAuthUser(current): MaybeAuthUser,
    ValidatedJson(form): ValidatedJson<RegisterForm>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    if let Some(user) = current {
        warn!(user_id = %user.id, "register while logged in");
        return Err(AppError::conflict("Already logged in"));
    }

    let creds = form.into_credentials();
    let user = create_user(&state.db, &creds).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "Account created for {}!",
            user.username
        ))),
    ))
}

#[instrument(skip(state, current, form))]
pub async fn login(
    State(state): State<AppState>,
    MaybeAuthUser(current): MaybeAuthUser,
    ValidatedJson(form): ValidatedJson<LoginForm>,
) -> AppResult<(HeaderMap, Json<MessageResponse>)> {
    if let Some(user) = current {
        warn!(user_id = %user.id, "login while logged in");
        return Err(AppError::conflict("Already logged in"));
    }

    let cfg = &state.config.session;
    let outcome = services::login(&state.db, cfg, form).await?;
    info!(user_id = %outcome.user.id, username = %outcome.user.username, "session opened");
    let headers = set_cookie(session::session_cookie(cfg, &outcome.token))?;
    Ok((headers, Json(MessageResponse::new("Login successful"))))
}

#[instrument(skip(state, user), fields(user_id = %user.id, username = %user.username))]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(HeaderMap, Json<MessageResponse>)> {
    session::delete(&state.db, user.session_id).await?;
    info!("user logged out");
    let headers = set_cookie(session::clear_cookie(&state.config.session))?;
    Ok((headers, Json(MessageResponse::new("Logged out successfully"))))
}
