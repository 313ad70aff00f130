use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{RotisForm, TotalRotisResponse},
    repo_types::UserMeal,
};
use crate::{
    auth::{dto::MessageResponse, extractors::AuthUser},
    db,
    error::{AppError, AppResult},
    meals::repo_types::Meal,
    state::AppState,
    validation::ValidatedJson,
};

pub fn consumption_routes() -> Router<AppState> {
    Router::new()
        .route("/user_meal/:meal_id", post(add_user_meal).put(update_user_meal))
        .route("/chef/rotis/:meal_id", get(total_rotis))
}

async fn chef_of(state: &AppState, meal_id: Uuid) -> AppResult<Uuid> {
    Meal::chef_of(&state.db, meal_id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal not found."))
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn add_user_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(meal_id): Path<Uuid>,
    ValidatedJson(form): ValidatedJson<RotisForm>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    chef_of(&state, meal_id).await?;

    let inserted = match UserMeal::insert_once(&state.db, user.id, meal_id, form.rotis).await {
        Ok(row) => row,
        Err(e) if db::is_foreign_key_violation(&e) => {
            return Err(AppError::not_found("Meal not found."));
        }
        Err(e) => return Err(e.into()),
    };
    let Some(record) = inserted else {
        warn!(%meal_id, "user meal already recorded");
        return Err(AppError::conflict(
            "User meal already exists. Use PUT to update.",
        ));
    };

    info!(meal_id = %record.meal_id, eater = %record.user_id, rotis = record.rotis, "user meal recorded");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User meal has been added!")),
    ))
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_user_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(meal_id): Path<Uuid>,
    ValidatedJson(form): ValidatedJson<RotisForm>,
) -> AppResult<Json<MessageResponse>> {
    chef_of(&state, meal_id).await?;

    let record = UserMeal::update_rotis(&state.db, user.id, meal_id, form.rotis)
        .await?
        .ok_or_else(|| AppError::not_found("User meal not found. Use POST to create."))?;

    info!(%meal_id, rotis = record.rotis, "user meal updated");
    Ok(Json(MessageResponse::new("User meal has been updated!")))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn total_rotis(
    State(state): State<AppState>,
    user: AuthUser,
    Path(meal_id): Path<Uuid>,
) -> AppResult<Json<TotalRotisResponse>> {
    if chef_of(&state, meal_id).await? != user.id {
        warn!(%meal_id, "non-chef asked for total rotis");
        return Err(AppError::forbidden("Only the chef can see the total rotis."));
    }
    let total_rotis = UserMeal::total_rotis(&state.db, meal_id).await?;
    Ok(Json(TotalRotisResponse { total_rotis }))
}
