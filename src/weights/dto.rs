use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::validation::{nullable, FieldErrors};
use crate::weights::repo_types::WeightFields;

const MIN_LBS: f64 = 50.0;
const MAX_LBS: f64 = 800.0;
const NOTE_MAX: usize = 140;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeightRequest {
    pub weight_lbs: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_for: OffsetDateTime,
    pub note: Option<String>,
}

impl CreateWeightRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.range("weightLbs", self.weight_lbs, MIN_LBS, MAX_LBS);
        errors.opt_text("note", self.note.as_deref(), 0, NOTE_MAX);
        errors.finish()
    }

    pub fn into_fields(self) -> WeightFields {
        WeightFields {
            weight_lbs: self.weight_lbs,
            recorded_for: self.recorded_for,
            note: self.note,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeightRequest {
    pub weight_lbs: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_for: Option<OffsetDateTime>,
    /// `null` clears the note.
    #[serde(default, deserialize_with = "nullable")]
    pub note: Option<Option<String>>,
}

impl UpdateWeightRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.opt_range("weightLbs", self.weight_lbs, MIN_LBS, MAX_LBS);
        let note = self.note.as_ref().and_then(Option::as_deref);
        errors.opt_text("note", note, 0, NOTE_MAX);
        errors.finish()
    }

    pub fn apply(self, current: WeightFields) -> WeightFields {
        WeightFields {
            weight_lbs: self.weight_lbs.unwrap_or(current.weight_lbs),
            recorded_for: self.recorded_for.unwrap_or(current.recorded_for),
            note: self.note.unwrap_or(current.note),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeightListQuery {
    pub limit: Option<String>,
}
