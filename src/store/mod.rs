use axum::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{MacroTarget, NewUser, User};
use crate::custom_foods::repo_types::{CustomFood, CustomFoodFields};
use crate::foods::repo_types::{Food, NewFood};
use crate::meals::repo_types::{Meal, MealDraft, MealItems};
use crate::nutrition::MacroGoals;
use crate::tenant::Owner;
use crate::weights::repo_types::{WeightFields, WeightLog};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl TimeRange {
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        at >= self.start && at < self.end
    }
}

/// Persistence for every entity the service owns. Methods taking an [`Owner`]
/// only ever see rows of that user in that experience.
#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn find_user_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<User>>;
    /// Creates the user together with its macro target. A concurrent insert of the
    /// same external id resolves to the existing row.
    async fn create_user(&self, new: NewUser, targets: MacroGoals) -> anyhow::Result<User>;
    async fn find_macro_target(&self, user_id: Uuid) -> anyhow::Result<Option<MacroTarget>>;
    async fn ensure_macro_target(
        &self,
        user_id: Uuid,
        targets: MacroGoals,
    ) -> anyhow::Result<MacroTarget>;

    // catalog
    async fn get_food(&self, id: Uuid) -> anyhow::Result<Option<Food>>;
    async fn upsert_food(&self, food: NewFood) -> anyhow::Result<Food>;
    async fn search_foods(&self, query: &str, limit: i64) -> anyhow::Result<Vec<Food>>;

    // custom foods
    async fn list_custom_foods(&self, owner: &Owner) -> anyhow::Result<Vec<CustomFood>>;
    async fn search_custom_foods(
        &self,
        owner: &Owner,
        query: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<CustomFood>>;
    async fn get_custom_food(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<CustomFood>>;
    async fn create_custom_food(
        &self,
        owner: &Owner,
        fields: CustomFoodFields,
    ) -> anyhow::Result<CustomFood>;
    async fn update_custom_food(
        &self,
        owner: &Owner,
        id: Uuid,
        fields: CustomFoodFields,
    ) -> anyhow::Result<Option<CustomFood>>;
    async fn delete_custom_food(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool>;

    // meals
    /// Meals logged inside `range`, oldest first.
    async fn list_meals(&self, owner: &Owner, range: TimeRange) -> anyhow::Result<Vec<Meal>>;
    async fn get_meal(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<Meal>>;
    async fn create_meal(
        &self,
        owner: &Owner,
        draft: MealDraft,
        items: MealItems,
    ) -> anyhow::Result<Meal>;
    /// `items: None` keeps the current line items and totals.
    async fn update_meal(
        &self,
        owner: &Owner,
        id: Uuid,
        draft: MealDraft,
        items: Option<MealItems>,
    ) -> anyhow::Result<Option<Meal>>;
    /// Removes the meal and its line items.
    async fn delete_meal(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool>;
    async fn meal_times(
        &self,
        owner: &Owner,
        range: TimeRange,
    ) -> anyhow::Result<Vec<OffsetDateTime>>;

    // weights
    /// Newest first, at most `limit` rows.
    async fn recent_weights(&self, owner: &Owner, limit: i64) -> anyhow::Result<Vec<WeightLog>>;
    /// Every reading, oldest first.
    async fn weight_history(&self, owner: &Owner) -> anyhow::Result<Vec<WeightLog>>;
    async fn get_weight(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<WeightLog>>;
    async fn create_weight(&self, owner: &Owner, fields: WeightFields) -> anyhow::Result<WeightLog>;
    async fn update_weight(
        &self,
        owner: &Owner,
        id: Uuid,
        fields: WeightFields,
    ) -> anyhow::Result<Option<WeightLog>>;
    async fn delete_weight(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool>;
}
