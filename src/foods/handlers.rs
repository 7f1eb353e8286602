use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{
    auth::extractors::AuthSession, error::AppResult, state::AppState, validation::clamp_limit,
};

pub fn food_routes() -> Router<AppState> {
    Router::new().route("/foods", get(search_foods))
}

#[derive(Debug, Deserialize)]
pub struct FoodSearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<String>,
}

/// Catalog matches are global; custom matches are the caller's own.
#[instrument(skip_all)]
pub async fn search_foods(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Query(params): Query<FoodSearchQuery>,
) -> AppResult<Json<Value>> {
    let query = params.q.trim();
    let limit = clamp_limit(params.limit.as_deref(), 15, 1, 50);
    let owner = session.owner();

    let (catalog, custom) = tokio::try_join!(
        state.store.search_foods(query, limit),
        state.store.search_custom_foods(&owner, query, limit),
    )?;

    debug!(query, catalog = catalog.len(), custom = custom.len(), "food search");
    Ok(Json(json!({ "data": { "catalog": catalog, "custom": custom } })))
}
