use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

/// Header carrying the hosting experience (tenant) identifier.
pub const EXPERIENCE_HEADER: &str = "x-whop-experience-id";

/// Experience the request runs in. `TenantId(None)` is a real scope of its own:
/// rows written without an experience are only visible to requests without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(Option<String>);

impl TenantId {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self::from_raw(Some(id.into()))
    }

    /// Blank values count as no experience.
    pub fn from_raw(raw: Option<String>) -> Self {
        Self(
            raw.map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        )
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_raw(
            headers
                .get(EXPERIENCE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        )
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn matches(&self, stored: Option<&str>) -> bool {
        self.as_deref() == stored
    }
}

/// The (user, experience) pair every tenant-scoped read and write filters by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub user_id: Uuid,
    pub tenant: TenantId,
}

impl Owner {
    pub fn new(user_id: Uuid, tenant: TenantId) -> Self {
        Self { user_id, tenant }
    }

    pub fn owns(&self, user_id: Uuid, experience_id: Option<&str>) -> bool {
        self.user_id == user_id && self.tenant.matches(experience_id)
    }
}
