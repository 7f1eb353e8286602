use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::services::{resolve_session, Session, SessionError};
use crate::error::AppError;
use crate::state::AppState;

/// Requires a valid platform session.
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(state, &parts.headers).await {
            Ok(session) => Ok(AuthSession(session)),
            Err(e @ (SessionError::MissingToken | SessionError::InvalidToken)) => {
                Err(AppError::unauthorized(e.to_string()))
            }
            Err(SessionError::NotConfigured(e)) => Err(AppError::Unexpected(e.into())),
            Err(SessionError::Storage(e)) => Err(AppError::Unexpected(e)),
        }
    }
}

/// Session when there is one. Missing or bad tokens and an unconfigured
/// platform yield `None`; storage failures still fail the request.
pub struct OptionalSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(state, &parts.headers).await {
            Ok(session) => Ok(OptionalSession(Some(session))),
            Err(SessionError::MissingToken | SessionError::InvalidToken) => {
                Ok(OptionalSession(None))
            }
            Err(SessionError::NotConfigured(e)) => {
                warn!(error = %e, "platform not configured; treating request as guest");
                Ok(OptionalSession(None))
            }
            Err(SessionError::Storage(e)) => Err(AppError::Unexpected(e)),
        }
    }
}
