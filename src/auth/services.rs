use sqlx::PgPool;
use tracing::{info, warn};

use super::{
    dto::{normalize_email, LoginForm},
    password::{verify_against_dummy, verify_password},
    session,
};
use crate::{
    config::SessionConfig,
    error::{AppError, AppResult},
    users::repo_types::User,
};

const BAD_CREDENTIALS: &str = "Login unsuccessful. Please check email and password";

/// A freshly opened session; `token` goes into the cookie and nowhere else.
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

pub async fn login(db: &PgPool, cfg: &SessionConfig, form: LoginForm) -> AppResult<LoginOutcome> {
    let email = normalize_email(&form.email.unwrap_or_default());
    let password = form.password.unwrap_or_default();

    let Some(user) = User::find_by_email(db, &email).await? else {
        verify_against_dummy(&password);
        warn!(%email, "login unknown email");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    let token = session::generate_token();
    let session_id = session::create(db, user.id, &token, cfg.ttl_minutes).await?;
    info!(user_id = %user.id, %session_id, "user logged in");
    Ok(LoginOutcome { user, token })
}
