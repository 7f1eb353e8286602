use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::MacroGoals;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,                     // local user ID
    pub external_id: String,          // platform user ID
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Profile fields captured when a platform user is first seen.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// A user's daily macro target. At most one per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MacroTarget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTarget {
    pub fn goals(&self) -> MacroGoals {
        MacroGoals {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
        }
    }
}
