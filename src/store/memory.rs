use axum::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, TimeRange};
use crate::auth::repo_types::{MacroTarget, NewUser, User};
use crate::custom_foods::repo_types::{CustomFood, CustomFoodFields};
use crate::foods::repo_types::{Food, NewFood};
use crate::meals::repo_types::{Meal, MealDraft, MealFood, MealItems};
use crate::nutrition::MacroGoals;
use crate::tenant::Owner;
use crate::weights::repo_types::{WeightFields, WeightLog};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    targets: Vec<MacroTarget>,
    foods: Vec<Food>,
    custom_foods: Vec<CustomFood>,
    meals: Vec<Meal>,
    weights: Vec<WeightLog>,
}

/// In-process [`Store`] used by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total line items across all meals; lets tests observe cascading deletes.
    pub async fn meal_food_count(&self) -> usize {
        self.tables.read().await.meals.iter().map(|m| m.foods.len()).sum()
    }
}

fn matches_query(name: &str, brand: Option<&str>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    name.to_lowercase().contains(&q) || brand.is_some_and(|b| b.to_lowercase().contains(&q))
}

fn new_target(user_id: Uuid, targets: MacroGoals) -> MacroTarget {
    MacroTarget {
        id: Uuid::new_v4(),
        user_id,
        calories: targets.calories,
        protein: targets.protein,
        carbs: targets.carbs,
        fats: targets.fats,
    }
}

fn materialize(items: &MealItems) -> Vec<MealFood> {
    items
        .items
        .iter()
        .map(|snapshot| MealFood {
            id: Uuid::new_v4(),
            snapshot: snapshot.clone(),
        })
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.external_id == external_id).cloned())
    }

    async fn create_user(&self, new: NewUser, targets: MacroGoals) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t.users.iter().find(|u| u.external_id == new.external_id) {
            return Ok(existing.clone());
        }
        let user = User {
            id: Uuid::new_v4(),
            external_id: new.external_id,
            email: new.email,
            display_name: new.display_name,
            created_at: OffsetDateTime::now_utc(),
        };
        t.targets.push(new_target(user.id, targets));
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_macro_target(&self, user_id: Uuid) -> anyhow::Result<Option<MacroTarget>> {
        let t = self.tables.read().await;
        Ok(t.targets.iter().find(|m| m.user_id == user_id).cloned())
    }

    async fn ensure_macro_target(
        &self,
        user_id: Uuid,
        targets: MacroGoals,
    ) -> anyhow::Result<MacroTarget> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t.targets.iter().find(|m| m.user_id == user_id) {
            return Ok(existing.clone());
        }
        let target = new_target(user_id, targets);
        t.targets.push(target.clone());
        Ok(target)
    }

    async fn get_food(&self, id: Uuid) -> anyhow::Result<Option<Food>> {
        let t = self.tables.read().await;
        Ok(t.foods.iter().find(|f| f.id == id).cloned())
    }

    async fn upsert_food(&self, food: NewFood) -> anyhow::Result<Food> {
        let mut t = self.tables.write().await;
        let id = t
            .foods
            .iter()
            .find(|f| f.external_id == food.external_id)
            .map(|f| f.id)
            .unwrap_or_else(Uuid::new_v4);
        let row = Food {
            id,
            external_id: food.external_id,
            source: "USDA".into(),
            name: food.name,
            brand: food.brand,
            serving_size: food.serving_size,
            serving_unit: food.serving_unit,
            protein_per_unit: food.macros.protein,
            carbs_per_unit: food.macros.carbs,
            fats_per_unit: food.macros.fats,
            calories_per_unit: food.macros.calories,
        };
        t.foods.retain(|f| f.id != id);
        t.foods.push(row.clone());
        Ok(row)
    }

    async fn search_foods(&self, query: &str, limit: i64) -> anyhow::Result<Vec<Food>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Food> = t
            .foods
            .iter()
            .filter(|f| matches_query(&f.name, f.brand.as_deref(), query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn list_custom_foods(&self, owner: &Owner) -> anyhow::Result<Vec<CustomFood>> {
        let t = self.tables.read().await;
        let mut rows: Vec<CustomFood> = t
            .custom_foods
            .iter()
            .filter(|f| owner.owns(f.user_id, f.experience_id.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn search_custom_foods(
        &self,
        owner: &Owner,
        query: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<CustomFood>> {
        let t = self.tables.read().await;
        let mut rows: Vec<CustomFood> = t
            .custom_foods
            .iter()
            .filter(|f| owner.owns(f.user_id, f.experience_id.as_deref()))
            .filter(|f| matches_query(&f.name, f.brand.as_deref(), query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn get_custom_food(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<CustomFood>> {
        let t = self.tables.read().await;
        Ok(t.custom_foods
            .iter()
            .find(|f| f.id == id && owner.owns(f.user_id, f.experience_id.as_deref()))
            .cloned())
    }

    async fn create_custom_food(
        &self,
        owner: &Owner,
        fields: CustomFoodFields,
    ) -> anyhow::Result<CustomFood> {
        let mut t = self.tables.write().await;
        let food = CustomFood {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            experience_id: owner.tenant.as_deref().map(str::to_string),
            name: fields.name,
            brand: fields.brand,
            serving_size: fields.serving_size,
            serving_unit: fields.serving_unit,
            protein_per_unit: fields.macros.protein,
            carbs_per_unit: fields.macros.carbs,
            fats_per_unit: fields.macros.fats,
            calories_per_unit: fields.macros.calories,
            updated_at: OffsetDateTime::now_utc(),
        };
        t.custom_foods.push(food.clone());
        Ok(food)
    }

    async fn update_custom_food(
        &self,
        owner: &Owner,
        id: Uuid,
        fields: CustomFoodFields,
    ) -> anyhow::Result<Option<CustomFood>> {
        let mut t = self.tables.write().await;
        let Some(food) = t
            .custom_foods
            .iter_mut()
            .find(|f| f.id == id && owner.owns(f.user_id, f.experience_id.as_deref()))
        else {
            return Ok(None);
        };
        food.name = fields.name;
        food.brand = fields.brand;
        food.serving_size = fields.serving_size;
        food.serving_unit = fields.serving_unit;
        food.protein_per_unit = fields.macros.protein;
        food.carbs_per_unit = fields.macros.carbs;
        food.fats_per_unit = fields.macros.fats;
        food.calories_per_unit = fields.macros.calories;
        food.updated_at = OffsetDateTime::now_utc();
        Ok(Some(food.clone()))
    }

    async fn delete_custom_food(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.custom_foods.len();
        t.custom_foods
            .retain(|f| !(f.id == id && owner.owns(f.user_id, f.experience_id.as_deref())));
        Ok(t.custom_foods.len() < before)
    }

    async fn list_meals(&self, owner: &Owner, range: TimeRange) -> anyhow::Result<Vec<Meal>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Meal> = t
            .meals
            .iter()
            .filter(|m| owner.owns(m.user_id, m.experience_id.as_deref()))
            .filter(|m| range.contains(m.logged_at))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.logged_at);
        Ok(rows)
    }

    async fn get_meal(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let t = self.tables.read().await;
        Ok(t.meals
            .iter()
            .find(|m| m.id == id && owner.owns(m.user_id, m.experience_id.as_deref()))
            .cloned())
    }

    async fn create_meal(
        &self,
        owner: &Owner,
        draft: MealDraft,
        items: MealItems,
    ) -> anyhow::Result<Meal> {
        let mut t = self.tables.write().await;
        let meal = Meal {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            experience_id: owner.tenant.as_deref().map(str::to_string),
            name: draft.name,
            logged_at: draft.logged_at,
            notes: draft.notes,
            protein: items.totals.protein,
            carbs: items.totals.carbs,
            fats: items.totals.fats,
            foods: materialize(&items),
        };
        t.meals.push(meal.clone());
        Ok(meal)
    }

    async fn update_meal(
        &self,
        owner: &Owner,
        id: Uuid,
        draft: MealDraft,
        items: Option<MealItems>,
    ) -> anyhow::Result<Option<Meal>> {
        let mut t = self.tables.write().await;
        let Some(meal) = t
            .meals
            .iter_mut()
            .find(|m| m.id == id && owner.owns(m.user_id, m.experience_id.as_deref()))
        else {
            return Ok(None);
        };
        meal.name = draft.name;
        meal.logged_at = draft.logged_at;
        meal.notes = draft.notes;
        if let Some(items) = items {
            meal.protein = items.totals.protein;
            meal.carbs = items.totals.carbs;
            meal.fats = items.totals.fats;
            meal.foods = materialize(&items);
        }
        Ok(Some(meal.clone()))
    }

    async fn delete_meal(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.meals.len();
        t.meals
            .retain(|m| !(m.id == id && owner.owns(m.user_id, m.experience_id.as_deref())));
        Ok(t.meals.len() < before)
    }

    async fn meal_times(
        &self,
        owner: &Owner,
        range: TimeRange,
    ) -> anyhow::Result<Vec<OffsetDateTime>> {
        Ok(self
            .list_meals(owner, range)
            .await?
            .into_iter()
            .map(|m| m.logged_at)
            .collect())
    }

    async fn recent_weights(&self, owner: &Owner, limit: i64) -> anyhow::Result<Vec<WeightLog>> {
        let mut rows = self.weight_history(owner).await?;
        rows.reverse();
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn weight_history(&self, owner: &Owner) -> anyhow::Result<Vec<WeightLog>> {
        let t = self.tables.read().await;
        let mut rows: Vec<WeightLog> = t
            .weights
            .iter()
            .filter(|w| owner.owns(w.user_id, w.experience_id.as_deref()))
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.recorded_for);
        Ok(rows)
    }

    async fn get_weight(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<WeightLog>> {
        let t = self.tables.read().await;
        Ok(t.weights
            .iter()
            .find(|w| w.id == id && owner.owns(w.user_id, w.experience_id.as_deref()))
            .cloned())
    }

    async fn create_weight(
        &self,
        owner: &Owner,
        fields: WeightFields,
    ) -> anyhow::Result<WeightLog> {
        let mut t = self.tables.write().await;
        let log = WeightLog {
            id: Uuid::new_v4(),
            user_id: owner.user_id,
            experience_id: owner.tenant.as_deref().map(str::to_string),
            weight_lbs: fields.weight_lbs,
            recorded_for: fields.recorded_for,
            note: fields.note,
        };
        t.weights.push(log.clone());
        Ok(log)
    }

    async fn update_weight(
        &self,
        owner: &Owner,
        id: Uuid,
        fields: WeightFields,
    ) -> anyhow::Result<Option<WeightLog>> {
        let mut t = self.tables.write().await;
        let Some(log) = t
            .weights
            .iter_mut()
            .find(|w| w.id == id && owner.owns(w.user_id, w.experience_id.as_deref()))
        else {
            return Ok(None);
        };
        log.weight_lbs = fields.weight_lbs;
        log.recorded_for = fields.recorded_for;
        log.note = fields.note;
        Ok(Some(log.clone()))
    }

    async fn delete_weight(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.weights.len();
        t.weights
            .retain(|w| !(w.id == id && owner.owns(w.user_id, w.experience_id.as_deref())));
        Ok(t.weights.len() < before)
    }
}
