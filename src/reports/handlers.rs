use anyhow::anyhow;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use super::aggregation::STREAK_LOOKBACK_DAYS;
use super::calendar::LocalClock;
use super::services::{build_dashboard, DashboardView};
use crate::{auth::extractors::OptionalSession, error::AppResult, state::AppState, tenant::TenantId};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<String>,
}

/// Guests get a landing payload instead of an error. Unparseable or out-of-range
/// dates show today.
#[instrument(skip_all)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    OptionalSession(session): OptionalSession,
    headers: HeaderMap,
    Query(q): Query<DashboardQuery>,
) -> AppResult<Json<Value>> {
    let Some(session) = session else {
        let view = DashboardView::Guest {
            experience_id: TenantId::from_headers(&headers),
        };
        return Ok(Json(json!({ "data": view })));
    };

    let clock = LocalClock::new(state.config.utc_offset);
    let window = q
        .date
        .as_deref()
        .and_then(|raw| clock.parse_date(raw))
        .and_then(|day| clock.report_window(day, STREAK_LOOKBACK_DAYS))
        .or_else(|| clock.report_window(clock.today(), STREAK_LOOKBACK_DAYS))
        .ok_or_else(|| anyhow!("today is outside the supported calendar"))?;

    let dashboard = build_dashboard(
        state.store.as_ref(),
        &session,
        &clock,
        &window,
        state.config.weight_goal_slope,
    )
    .await?;

    Ok(Json(json!({ "data": DashboardView::Ready(Box::new(dashboard)) })))
}
