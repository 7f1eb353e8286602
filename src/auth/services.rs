use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::platform::PlatformError;
use crate::auth::repo_types::{MacroTarget, NewUser, User};
use crate::state::AppState;
use crate::tenant::{Owner, TenantId};

/// Header the platform proxy puts the user token in.
pub const TOKEN_HEADER: &str = "x-whop-user-token";

/// An authenticated caller inside one experience.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub macro_target: MacroTarget,
    #[serde(rename = "experienceId")]
    pub tenant: TenantId,
}

impl Session {
    pub fn owner(&self) -> Owner {
        Owner::new(self.user.id, self.tenant.clone())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing Whop user token header.")]
    MissingToken,

    #[error("Invalid Whop user token.")]
    InvalidToken,

    #[error("session unavailable: {0}")]
    NotConfigured(PlatformError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Platform token from `x-whop-user-token`, or a bearer `Authorization` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let direct = headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if direct.is_some() {
        return direct;
    }

    let auth = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the caller's token and maps it to a local user, creating the user
/// (with default macro targets) on first sight.
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Session, SessionError> {
    let token = token_from_headers(headers).ok_or(SessionError::MissingToken)?;
    let tenant = TenantId::from_headers(headers);

    let external_id = match state.platform.verify_user_token(token).await {
        Ok(id) => id,
        Err(PlatformError::InvalidToken) => return Err(SessionError::InvalidToken),
        Err(e) => return Err(SessionError::NotConfigured(e)),
    };

    let store = state.store.as_ref();
    let defaults = state.config.default_targets;

    let user = match store.find_user_by_external_id(&external_id).await? {
        Some(user) => user,
        None => {
            let profile = match state.platform.fetch_profile(&external_id).await {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, external_id = %external_id, "profile fetch failed");
                    Default::default()
                }
            };
            let user = store
                .create_user(
                    NewUser {
                        external_id: external_id.clone(),
                        email: profile.email,
                        display_name: profile.display_name,
                    },
                    defaults,
                )
                .await?;
            info!(user_id = %user.id, external_id = %external_id, "user created");
            user
        }
    };

    let macro_target = match store.find_macro_target(user.id).await? {
        Some(t) => t,
        None => store.ensure_macro_target(user.id, defaults).await?,
    };

    debug!(user_id = %user.id, tenant = ?tenant.as_deref(), "session resolved");
    Ok(Session {
        user,
        macro_target,
        tenant,
    })
}
