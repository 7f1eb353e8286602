use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthSession,
    custom_foods::dto::{CreateCustomFoodRequest, UpdateCustomFoodRequest},
    error::{AppError, AppResult},
    state::AppState,
    validation::{parse_id, ApiJson},
};

const FOOD_NOT_FOUND: &str = "Food not found.";

pub fn custom_food_routes() -> Router<AppState> {
    Router::new()
        .route("/custom-foods", get(list_custom_foods).post(create_custom_food))
        .route(
            "/custom-foods/:id",
            patch(update_custom_food).delete(delete_custom_food),
        )
}

/// Most recently edited first.
#[instrument(skip_all)]
pub async fn list_custom_foods(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> AppResult<Json<Value>> {
    let foods = state.store.list_custom_foods(&session.owner()).await?;
    Ok(Json(json!({ "data": foods })))
}

#[instrument(skip_all)]
pub async fn create_custom_food(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<CreateCustomFoodRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;
    let food = state
        .store
        .create_custom_food(&session.owner(), body.into_fields())
        .await?;
    info!(user_id = %session.user.id, food_id = %food.id, "custom food created");
    Ok((StatusCode::CREATED, Json(json!({ "data": food }))))
}

#[instrument(skip_all)]
pub async fn update_custom_food(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCustomFoodRequest>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, FOOD_NOT_FOUND)?;
    body.validate()?;
    let owner = session.owner();

    let existing = state
        .store
        .get_custom_food(&owner, id)
        .await?
        .ok_or(AppError::NotFound(FOOD_NOT_FOUND))?;
    let food = state
        .store
        .update_custom_food(&owner, id, body.apply(existing.fields()))
        .await?
        .ok_or(AppError::NotFound(FOOD_NOT_FOUND))?;
    Ok(Json(json!({ "data": food })))
}

#[instrument(skip_all)]
pub async fn delete_custom_food(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, FOOD_NOT_FOUND)?;
    if !state.store.delete_custom_food(&session.owner(), id).await? {
        return Err(AppError::NotFound(FOOD_NOT_FOUND));
    }
    Ok(Json(json!({ "success": true })))
}
