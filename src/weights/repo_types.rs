use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeightLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Option<String>,
    pub weight_lbs: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_for: OffsetDateTime,
    pub note: Option<String>,
}

/// Editable columns of a weigh-in.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightFields {
    pub weight_lbs: f64,
    pub recorded_for: OffsetDateTime,
    pub note: Option<String>,
}
