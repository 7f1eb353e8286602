use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthSession,
    error::{AppError, AppResult},
    meals::{
        dto::{CreateMealRequest, MealListQuery, UpdateMealRequest},
        repo_types::MealDraft,
        services::build_meal_items,
    },
    reports::calendar::LocalClock,
    state::AppState,
    validation::{parse_id, ApiJson},
};

const MEAL_NOT_FOUND: &str = "Meal not found.";

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", get(get_meal).patch(update_meal).delete(delete_meal))
}

/// Meals of one local day, oldest first. No `date` means today.
#[instrument(skip_all)]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Query(q): Query<MealListQuery>,
) -> AppResult<Json<Value>> {
    let clock = LocalClock::new(state.config.utc_offset);
    let day = match q.date.as_deref() {
        Some(raw) => clock.parse_date(raw),
        None => Some(clock.today()),
    };
    let range = day
        .and_then(|day| clock.day_range(day))
        .ok_or_else(|| AppError::invalid("date", "Invalid date."))?;

    let meals = state.store.list_meals(&session.owner(), range).await?;
    Ok(Json(json!({ "data": meals })))
}

#[instrument(skip_all)]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<CreateMealRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;
    let owner = session.owner();

    let items = build_meal_items(state.store.as_ref(), &owner, &body.foods).await?;
    let draft = MealDraft {
        name: body.name,
        logged_at: body.logged_at,
        notes: body.notes,
    };
    let meal = state.store.create_meal(&owner, draft, items).await?;

    info!(user_id = %owner.user_id, meal_id = %meal.id, foods = meal.foods.len(), "meal created");
    Ok((StatusCode::CREATED, Json(json!({ "data": meal }))))
}

#[instrument(skip_all)]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, MEAL_NOT_FOUND)?;
    let meal = state
        .store
        .get_meal(&session.owner(), id)
        .await?
        .ok_or(AppError::NotFound(MEAL_NOT_FOUND))?;
    Ok(Json(json!({ "data": meal })))
}

#[instrument(skip_all)]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateMealRequest>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, MEAL_NOT_FOUND)?;
    body.validate()?;
    let owner = session.owner();

    let existing = state
        .store
        .get_meal(&owner, id)
        .await?
        .ok_or(AppError::NotFound(MEAL_NOT_FOUND))?;

    let items = match &body.foods {
        Some(foods) => Some(build_meal_items(state.store.as_ref(), &owner, foods).await?),
        None => None,
    };
    let draft = MealDraft {
        name: body.name.unwrap_or(existing.name),
        logged_at: body.logged_at.unwrap_or(existing.logged_at),
        notes: body.notes.unwrap_or(existing.notes),
    };

    let meal = state
        .store
        .update_meal(&owner, id, draft, items)
        .await?
        .ok_or(AppError::NotFound(MEAL_NOT_FOUND))?;
    Ok(Json(json!({ "data": meal })))
}

#[instrument(skip_all)]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, MEAL_NOT_FOUND)?;
    if !state.store.delete_meal(&session.owner(), id).await? {
        return Err(AppError::NotFound(MEAL_NOT_FOUND));
    }
    info!(user_id = %session.user.id, meal_id = %id, "meal deleted");
    Ok(Json(json!({ "success": true })))
}
