use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Validation failures keyed by field path, e.g. `foods[0].quantity`.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, msg: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(msg.into());
    }

    pub fn form(&mut self, msg: impl Into<String>) {
        self.form_errors.push(msg.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.push(field, format!("must be at least {min} characters"));
        } else if len > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    pub fn opt_text(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(v) = value {
            self.text(field, v, min, max);
        }
    }

    /// Inclusive range check; NaN and infinities always fail.
    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() || value < min || value > max {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    pub fn opt_range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64) {
        if let Some(v) = value {
            self.range(field, v, min, max);
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// For PATCH fields that can be cleared: absent stays `None`, `null` becomes
/// `Some(None)`. Pair with `#[serde(default)]`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `Json` whose rejections come back as 422 validation errors.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let mut errors = FieldErrors::default();
                errors.form(rejection_message(&rejection));
                Err(AppError::Validation(errors))
            }
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "expected an application/json body".into(),
        other => other.body_text(),
    }
}

/// Path ids that do not parse cannot name an existing row.
pub fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(not_found))
}

/// Lenient `limit` query parsing: garbage falls back to the default, numbers are clamped.
pub fn clamp_limit(raw: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| (v as i64).clamp(min, max))
        .unwrap_or(default)
}
