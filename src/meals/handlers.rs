use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreatedMealResponse, MealFields, MealFilter, MealForm, MealView},
    repo_types::Meal,
    services::{current_slot, meal_clock_now},
};
use crate::{
    auth::{dto::MessageResponse, extractors::AuthUser},
    error::{AppError, AppResult},
    state::AppState,
    validation::{query_rejection, ValidatedJson},
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/current", get(current_meal))
        .route("/meals/filter", get(filter_meals))
        .route("/meal/new", post(create_meal))
        .route("/meal/:id", get(get_meal).put(update_meal).delete(delete_meal))
}

fn fields_of(form: MealForm) -> AppResult<MealFields> {
    form.into_fields()
        .ok_or_else(|| AppError::field("meal_type", "Not a valid choice."))
}

/// Fails unless the meal exists and `user` is its chef.
async fn ensure_chef(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let chef = Meal::chef_of(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal not found."))?;
    if chef != user.id {
        warn!(meal_id = %id, user_id = %user.id, "non-chef tried to modify meal");
        return Err(AppError::forbidden("Only the chef can modify this meal."));
    }
    Ok(())
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create_meal(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(form): ValidatedJson<MealForm>,
) -> AppResult<(StatusCode, HeaderMap, Json<CreatedMealResponse>)> {
    let fields = fields_of(form)?;
    let (today, _) = current_slot(meal_clock_now(state.config.meal_clock_offset));
    let meal = Meal::create(&state.db, user.id, today, &fields).await?;
    info!(meal_id = %meal.id, meal_type = %meal.meal_type, date = %meal.date, "meal created");

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/meal/{}", meal.id))
        .map_err(|e| AppError::Internal(e.into()))?;
    headers.insert(header::LOCATION, location);

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedMealResponse {
            message: "Meal has been added!".into(),
            id: meal.id,
        }),
    ))
}

#[instrument(skip(state, _user))]
pub async fn list_meals(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<MealView>>> {
    let meals = Meal::list(&state.db).await?;
    Ok(Json(meals.into_iter().map(MealView::from).collect()))
}

#[instrument(skip(state))]
pub async fn current_meal(State(state): State<AppState>) -> AppResult<Json<MealView>> {
    let (today, slot) = current_slot(meal_clock_now(state.config.meal_clock_offset));
    let meal = Meal::find_for_slot(&state.db, today, slot)
        .await?
        .ok_or_else(|| AppError::not_found("No meal found for this time."))?;
    Ok(Json(meal.into()))
}

#[instrument(skip(state, _user, query))]
pub async fn filter_meals(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<MealFilter>, QueryRejection>,
) -> AppResult<Json<Vec<MealView>>> {
    let Query(filter) = query.map_err(query_rejection)?;
    let meals = Meal::list_filtered(&state.db, &filter).await?;
    Ok(Json(meals.into_iter().map(MealView::from).collect()))
}

#[instrument(skip(state, _user))]
pub async fn get_meal(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MealView>> {
    let meal = Meal::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal not found."))?;
    Ok(Json(meal.into()))
}

#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(form): ValidatedJson<MealForm>,
) -> AppResult<Json<MessageResponse>> {
    let fields = fields_of(form)?;
    ensure_chef(&state, &user, id).await?;
    Meal::update(&state.db, id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Meal not found."))?;
    info!(meal_id = %id, "meal updated");
    Ok(Json(MessageResponse::new("Meal has been updated!")))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    ensure_chef(&state, &user, id).await?;
    if !Meal::delete(&state.db, id).await? {
        return Err(AppError::not_found("Meal not found."));
    }
    info!(meal_id = %id, "meal deleted");
    Ok(Json(MessageResponse::new("Meal has been deleted!")))
}
