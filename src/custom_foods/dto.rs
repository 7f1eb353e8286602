use serde::Deserialize;

use crate::custom_foods::repo_types::CustomFoodFields;
use crate::error::AppError;
use crate::nutrition::MacrosPerUnit;
use crate::validation::{nullable, FieldErrors};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomFoodRequest {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub protein_per_unit: f64,
    pub carbs_per_unit: f64,
    pub fats_per_unit: f64,
    pub calories_per_unit: Option<f64>,
}

impl CreateCustomFoodRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.text("name", &self.name, 1, 120);
        errors.opt_text("brand", self.brand.as_deref(), 0, 120);
        errors.range("servingSize", self.serving_size, 0.1, 2000.0);
        errors.text("servingUnit", &self.serving_unit, 1, 40);
        errors.range("proteinPerUnit", self.protein_per_unit, 0.0, 200.0);
        errors.range("carbsPerUnit", self.carbs_per_unit, 0.0, 300.0);
        errors.range("fatsPerUnit", self.fats_per_unit, 0.0, 200.0);
        errors.opt_range("caloriesPerUnit", self.calories_per_unit, 0.0, 2000.0);
        errors.finish()
    }

    pub fn into_fields(self) -> CustomFoodFields {
        CustomFoodFields {
            name: self.name,
            brand: self.brand,
            serving_size: self.serving_size,
            serving_unit: self.serving_unit,
            macros: MacrosPerUnit {
                protein: self.protein_per_unit,
                carbs: self.carbs_per_unit,
                fats: self.fats_per_unit,
                calories: self.calories_per_unit,
            },
        }
    }
}

/// Partial update; omitted fields keep their stored values, `null` clears
/// `brand` and `caloriesPerUnit`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomFoodRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand: Option<Option<String>>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub protein_per_unit: Option<f64>,
    pub carbs_per_unit: Option<f64>,
    pub fats_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub calories_per_unit: Option<Option<f64>>,
}

impl UpdateCustomFoodRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.opt_text("name", self.name.as_deref(), 1, 120);
        let brand = self.brand.as_ref().and_then(Option::as_deref);
        errors.opt_text("brand", brand, 0, 120);
        errors.opt_range("servingSize", self.serving_size, 0.1, 2000.0);
        errors.opt_text("servingUnit", self.serving_unit.as_deref(), 1, 40);
        errors.opt_range("proteinPerUnit", self.protein_per_unit, 0.0, 200.0);
        errors.opt_range("carbsPerUnit", self.carbs_per_unit, 0.0, 300.0);
        errors.opt_range("fatsPerUnit", self.fats_per_unit, 0.0, 200.0);
        errors.opt_range("caloriesPerUnit", self.calories_per_unit.flatten(), 0.0, 2000.0);
        errors.finish()
    }

    pub fn apply(self, current: CustomFoodFields) -> CustomFoodFields {
        CustomFoodFields {
            name: self.name.unwrap_or(current.name),
            brand: self.brand.unwrap_or(current.brand),
            serving_size: self.serving_size.unwrap_or(current.serving_size),
            serving_unit: self.serving_unit.unwrap_or(current.serving_unit),
            macros: MacrosPerUnit {
                protein: self.protein_per_unit.unwrap_or(current.macros.protein),
                carbs: self.carbs_per_unit.unwrap_or(current.macros.carbs),
                fats: self.fats_per_unit.unwrap_or(current.macros.fats),
                calories: self.calories_per_unit.unwrap_or(current.macros.calories),
            },
        }
    }
}
