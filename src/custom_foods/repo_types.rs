use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::MacrosPerUnit;

/// A user's own food, scoped to the experience it was created in.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomFood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Option<String>,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub protein_per_unit: f64,
    pub carbs_per_unit: f64,
    pub fats_per_unit: f64,
    pub calories_per_unit: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CustomFood {
    pub fn macros_per_unit(&self) -> MacrosPerUnit {
        MacrosPerUnit {
            protein: self.protein_per_unit,
            carbs: self.carbs_per_unit,
            fats: self.fats_per_unit,
            calories: self.calories_per_unit,
        }
    }

    pub fn fields(&self) -> CustomFoodFields {
        CustomFoodFields {
            name: self.name.clone(),
            brand: self.brand.clone(),
            serving_size: self.serving_size,
            serving_unit: self.serving_unit.clone(),
            macros: self.macros_per_unit(),
        }
    }
}

/// Editable columns of a custom food.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFoodFields {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub macros: MacrosPerUnit,
}
