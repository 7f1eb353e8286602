use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthSession,
    error::{AppError, AppResult},
    state::AppState,
    validation::{clamp_limit, parse_id, ApiJson},
    weights::{
        dto::{CreateWeightRequest, UpdateWeightRequest, WeightListQuery},
        repo_types::WeightFields,
    },
};

const WEIGHT_NOT_FOUND: &str = "Weight log not found.";

pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route("/weights", get(list_weights).post(create_weight))
        .route("/weights/:id", patch(update_weight).delete(delete_weight))
}

/// Newest first; `limit` defaults to 30 and is clamped to 1..=120.
#[instrument(skip_all)]
pub async fn list_weights(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Query(q): Query<WeightListQuery>,
) -> AppResult<Json<Value>> {
    let limit = clamp_limit(q.limit.as_deref(), 30, 1, 120);
    let logs = state.store.recent_weights(&session.owner(), limit).await?;
    Ok(Json(json!({ "data": logs })))
}

#[instrument(skip_all)]
pub async fn create_weight(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    ApiJson(body): ApiJson<CreateWeightRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    body.validate()?;
    let log = state
        .store
        .create_weight(&session.owner(), body.into_fields())
        .await?;
    info!(user_id = %session.user.id, weight_id = %log.id, "weight logged");
    Ok((StatusCode::CREATED, Json(json!({ "data": log }))))
}

#[instrument(skip_all)]
pub async fn update_weight(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateWeightRequest>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, WEIGHT_NOT_FOUND)?;
    body.validate()?;
    let owner = session.owner();

    let existing = state
        .store
        .get_weight(&owner, id)
        .await?
        .ok_or(AppError::NotFound(WEIGHT_NOT_FOUND))?;
    let current = WeightFields {
        weight_lbs: existing.weight_lbs,
        recorded_for: existing.recorded_for,
        note: existing.note,
    };
    let log = state
        .store
        .update_weight(&owner, id, body.apply(current))
        .await?
        .ok_or(AppError::NotFound(WEIGHT_NOT_FOUND))?;
    Ok(Json(json!({ "data": log })))
}

#[instrument(skip_all)]
pub async fn delete_weight(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id, WEIGHT_NOT_FOUND)?;
    if !state.store.delete_weight(&session.owner(), id).await? {
        return Err(AppError::NotFound(WEIGHT_NOT_FOUND));
    }
    Ok(Json(json!({ "success": true })))
}
