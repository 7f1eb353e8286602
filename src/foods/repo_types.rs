use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::nutrition::MacrosPerUnit;

/// Shared catalog row. Written only by the catalog import, read-only to handlers.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub external_id: String,
    pub source: String,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub protein_per_unit: f64,
    pub carbs_per_unit: f64,
    pub fats_per_unit: f64,
    pub calories_per_unit: Option<f64>,
}

impl Food {
    pub fn macros_per_unit(&self) -> MacrosPerUnit {
        MacrosPerUnit {
            protein: self.protein_per_unit,
            carbs: self.carbs_per_unit,
            fats: self.fats_per_unit,
            calories: self.calories_per_unit,
        }
    }
}

/// Catalog row keyed by `external_id`; upserting the same id twice updates in place.
#[derive(Debug, Clone)]
pub struct NewFood {
    pub external_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub macros: MacrosPerUnit,
}

impl NewFood {
    /// Development staples so food search is never empty.
    pub fn staples() -> Vec<NewFood> {
        vec![
            NewFood {
                external_id: "sample-chicken".into(),
                name: "Chicken Breast (Cooked)".into(),
                brand: None,
                serving_size: 100.0,
                serving_unit: "g".into(),
                macros: MacrosPerUnit {
                    protein: 31.0,
                    carbs: 0.0,
                    fats: 3.6,
                    calories: Some(165.0),
                },
            },
            NewFood {
                external_id: "sample-rice".into(),
                name: "White Rice (Cooked)".into(),
                brand: None,
                serving_size: 100.0,
                serving_unit: "g".into(),
                macros: MacrosPerUnit {
                    protein: 2.4,
                    carbs: 28.0,
                    fats: 0.3,
                    calories: Some(130.0),
                },
            },
        ]
    }
}
