use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
    auth::{dto::MeResponse, extractors::AuthSession},
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn get_me(AuthSession(session): AuthSession) -> Json<Value> {
    let me = MeResponse {
        id: session.user.id,
        external_id: session.user.external_id,
        email: session.user.email,
        display_name: session.user.display_name,
        experience_id: session.tenant,
        macro_target: session.macro_target.goals(),
    };
    Json(json!({ "data": me }))
}
