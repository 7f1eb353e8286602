use crate::state::AppState;
use axum::Router;

pub mod aggregation;
pub mod calendar;
pub mod handlers;
pub mod services;
pub mod weight;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::dashboard_routes())
}
