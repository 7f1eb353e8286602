use anyhow::bail;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{MacroTotals, ScaledMacros};

/// Where a line item's macros came from. Each variant carries only its own reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum FoodSource {
    #[serde(rename = "USDA")]
    Catalog {
        #[serde(rename = "foodId")]
        food_id: Uuid,
    },
    #[serde(rename = "CUSTOM")]
    Custom {
        #[serde(rename = "customFoodId")]
        custom_food_id: Uuid,
    },
    #[serde(rename = "QUICK_ADD")]
    QuickAdd,
}

impl FoodSource {
    pub fn label(&self) -> &'static str {
        match self {
            FoodSource::Catalog { .. } => "USDA",
            FoodSource::Custom { .. } => "CUSTOM",
            FoodSource::QuickAdd => "QUICK_ADD",
        }
    }

    pub fn food_id(&self) -> Option<Uuid> {
        match self {
            FoodSource::Catalog { food_id } => Some(*food_id),
            _ => None,
        }
    }

    pub fn custom_food_id(&self) -> Option<Uuid> {
        match self {
            FoodSource::Custom { custom_food_id } => Some(*custom_food_id),
            _ => None,
        }
    }

    /// Rebuilds the variant from the `source`, `food_id`, `custom_food_id` columns.
    pub fn from_columns(
        source: &str,
        food_id: Option<Uuid>,
        custom_food_id: Option<Uuid>,
    ) -> anyhow::Result<Self> {
        match (source, food_id, custom_food_id) {
            ("USDA", Some(food_id), None) => Ok(FoodSource::Catalog { food_id }),
            ("CUSTOM", None, Some(custom_food_id)) => Ok(FoodSource::Custom { custom_food_id }),
            ("QUICK_ADD", None, None) => Ok(FoodSource::QuickAdd),
            _ => bail!("meal food row has inconsistent source {source:?}"),
        }
    }
}

/// Line item values frozen at the time the meal was saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFoodSnapshot {
    #[serde(flatten)]
    pub source: FoodSource,
    pub name: String,
    pub brand: Option<String>,
    pub serving_unit: Option<String>,
    pub quantity: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: Option<f64>,
}

impl MealFoodSnapshot {
    pub fn macros(&self) -> ScaledMacros {
        ScaledMacros {
            totals: MacroTotals::new(self.protein, self.carbs, self.fats),
            calories: self.calories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealFood {
    pub id: Uuid,
    #[serde(flatten)]
    pub snapshot: MealFoodSnapshot,
}

/// Hydrated line items plus the totals the meal row stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealItems {
    pub items: Vec<MealFoodSnapshot>,
    pub totals: MacroTotals,
}

/// Header fields of a meal, as written by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct MealDraft {
    pub name: String,
    pub logged_at: OffsetDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Option<String>,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub notes: Option<String>,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub foods: Vec<MealFood>,
}

impl Meal {
    /// Totals stored on the meal at its last write.
    pub fn totals(&self) -> MacroTotals {
        MacroTotals::new(self.protein, self.carbs, self.fats)
    }

    /// Whole kcal: explicit line calories where present, 4/4/9 estimate otherwise.
    pub fn calories(&self) -> f64 {
        self.foods
            .iter()
            .map(|f| f.snapshot.macros().calories_or_estimate())
            .sum::<f64>()
            .round()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Option<String>,
    pub name: String,
    pub logged_at: OffsetDateTime,
    pub notes: Option<String>,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MealRow {
    pub fn into_meal(self, foods: Vec<MealFood>) -> Meal {
        Meal {
            id: self.id,
            user_id: self.user_id,
            experience_id: self.experience_id,
            name: self.name,
            logged_at: self.logged_at,
            notes: self.notes,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            foods,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MealFoodRow {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub source: String,
    pub food_id: Option<Uuid>,
    pub custom_food_id: Option<Uuid>,
    pub name: String,
    pub brand: Option<String>,
    pub serving_unit: Option<String>,
    pub quantity: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: Option<f64>,
}

impl TryFrom<MealFoodRow> for MealFood {
    type Error = anyhow::Error;

    fn try_from(r: MealFoodRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            snapshot: MealFoodSnapshot {
                source: FoodSource::from_columns(&r.source, r.food_id, r.custom_food_id)?,
                name: r.name,
                brand: r.brand,
                serving_unit: r.serving_unit,
                quantity: r.quantity,
                protein: r.protein,
                carbs: r.carbs,
                fats: r.fats,
                calories: r.calories,
            },
        })
    }
}
