use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::PublicUser, repo_types::User, services::replace_user};
use crate::{
    auth::{
        dto::{MessageResponse, RegisterForm},
        extractors::AuthUser,
    },
    error::{AppError, AppResult},
    state::AppState,
    validation::ValidatedJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/user/:id", get(get_user).put(update_user).delete(delete_user))
}

fn ensure_self(caller: &AuthUser, id: Uuid) -> AppResult<()> {
    if caller.id == id {
        Ok(())
    } else {
        warn!(caller = %caller.id, target = %id, "user tried to modify another account");
        Err(AppError::forbidden("You can only modify your own account."))
    }
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, _user))]
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller, form))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(form): ValidatedJson<RegisterForm>,
) -> AppResult<Json<MessageResponse>> {
    ensure_self(&caller, id)?;
    let user = replace_user(&state.db, id, &form.into_credentials()).await?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(MessageResponse::new("User has been updated!")))
}

#[instrument(skip(state, caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    ensure_self(&caller, id)?;
    if !User::delete(&state.db, id).await? {
        return Err(AppError::not_found("User not found."));
    }
    info!(user_id = %id, "user deleted");
    Ok(Json(MessageResponse::new("User has been deleted!")))
}
