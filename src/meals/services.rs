use crate::error::{AppError, AppResult};
use crate::meals::dto::MealFoodInput;
use crate::meals::repo_types::{FoodSource, MealFoodSnapshot, MealItems};
use crate::nutrition::{MacroTotals, MacrosPerUnit};
use crate::store::Store;
use crate::tenant::Owner;

/// Resolves submitted line items into snapshots, scaling per-unit macros by
/// quantity. Totals are the rounded sum of the snapshots.
pub async fn build_meal_items(
    store: &dyn Store,
    owner: &Owner,
    inputs: &[MealFoodInput],
) -> AppResult<MealItems> {
    let mut items = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        items.push(hydrate(store, owner, i, input).await?);
    }
    let totals = items
        .iter()
        .map(|item| item.macros().totals)
        .sum::<MacroTotals>()
        .rounded();
    Ok(MealItems { items, totals })
}

/// Name, labels and per-unit macros a line item is snapshotted from.
struct Resolved {
    name: String,
    brand: Option<String>,
    serving_unit: Option<String>,
    per_unit: MacrosPerUnit,
}

async fn hydrate(
    store: &dyn Store,
    owner: &Owner,
    index: usize,
    input: &MealFoodInput,
) -> AppResult<MealFoodSnapshot> {
    let resolved = match input.source {
        FoodSource::Catalog { food_id } => {
            let food = store
                .get_food(food_id)
                .await?
                .ok_or(AppError::NotFound("Food item not found."))?;
            Resolved {
                per_unit: food.macros_per_unit(),
                name: food.name,
                brand: food.brand,
                serving_unit: Some(food.serving_unit),
            }
        }
        FoodSource::Custom { custom_food_id } => {
            let food = store
                .get_custom_food(owner, custom_food_id)
                .await?
                .ok_or(AppError::NotFound("Custom food not found."))?;
            Resolved {
                per_unit: food.macros_per_unit(),
                name: food.name,
                brand: food.brand,
                serving_unit: Some(food.serving_unit),
            }
        }
        FoodSource::QuickAdd => {
            let per_unit = input.macros().ok_or_else(|| {
                AppError::invalid(
                    format!("foods[{index}].macros"),
                    "Missing macro information for quick add food.",
                )
            })?;
            let name = input.name.clone().ok_or_else(|| {
                AppError::invalid(
                    format!("foods[{index}].name"),
                    "is required for quick add foods",
                )
            })?;
            Resolved {
                name,
                brand: input.brand.clone(),
                serving_unit: input.serving_unit.clone(),
                per_unit,
            }
        }
    };

    let scaled = resolved.per_unit.scaled(input.quantity);
    Ok(MealFoodSnapshot {
        source: input.source,
        name: resolved.name,
        brand: resolved.brand,
        serving_unit: resolved.serving_unit,
        quantity: input.quantity,
        protein: scaled.totals.protein,
        carbs: scaled.totals.carbs,
        fats: scaled.totals.fats,
        calories: scaled.calories,
    })
}
