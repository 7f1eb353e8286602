use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::meals::repo_types::FoodSource;
use crate::nutrition::MacrosPerUnit;
use crate::validation::{nullable, FieldErrors};

/// One submitted line item. Catalog and custom items take their name and
/// macros from the referenced row; quick adds carry both inline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodInput {
    #[serde(flatten)]
    pub source: FoodSource,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub serving_unit: Option<String>,
    pub quantity: f64,
    #[serde(alias = "macros")]
    pub quick_add_macros: Option<MacrosPerUnit>,
    pub macros_per_unit: Option<MacrosPerUnit>,
}

impl MealFoodInput {
    /// Quick add macros win over the per-unit copy the form sends alongside them.
    pub fn macros(&self) -> Option<MacrosPerUnit> {
        self.quick_add_macros.or(self.macros_per_unit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub notes: Option<String>,
    pub foods: Vec<MealFoodInput>,
}

impl CreateMealRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.text("name", &self.name, 1, 120);
        errors.opt_text("notes", self.notes.as_deref(), 0, 240);
        validate_foods(&mut errors, &self.foods);
        errors.finish()
    }
}

/// Omitted fields keep their stored values and `"notes": null` clears the notes.
/// `foods`, when present, replaces every line item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
    pub foods: Option<Vec<MealFoodInput>>,
}

impl UpdateMealRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::default();
        errors.opt_text("name", self.name.as_deref(), 1, 120);
        let notes = self.notes.as_ref().and_then(Option::as_deref);
        errors.opt_text("notes", notes, 0, 240);
        if let Some(foods) = &self.foods {
            validate_foods(&mut errors, foods);
        }
        errors.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct MealListQuery {
    pub date: Option<String>,
}

fn validate_foods(errors: &mut FieldErrors, foods: &[MealFoodInput]) {
    if foods.is_empty() {
        errors.push("foods", "must contain at least 1 item");
    }
    for (i, food) in foods.iter().enumerate() {
        let field = |name: &str| format!("foods[{i}].{name}");

        errors.range(&field("quantity"), food.quantity, 0.1, 20.0);
        errors.opt_text(&field("name"), food.name.as_deref(), 1, 120);
        errors.opt_text(&field("brand"), food.brand.as_deref(), 0, 120);
        errors.opt_text(&field("servingUnit"), food.serving_unit.as_deref(), 0, 40);

        if food.source == FoodSource::QuickAdd && food.name.is_none() {
            errors.push(field("name"), "is required for quick add foods");
        }
        if let Some(m) = food.macros() {
            errors.range(&field("macros.protein"), m.protein, 0.0, 200.0);
            errors.range(&field("macros.carbs"), m.carbs, 0.0, 300.0);
            errors.range(&field("macros.fats"), m.fats, 0.0, 150.0);
            errors.opt_range(&field("macros.calories"), m.calories, 0.0, 2000.0);
        }
    }
}
