use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, TimeRange};
use crate::auth::repo_types::{MacroTarget, NewUser, User};
use crate::custom_foods::repo_types::{CustomFood, CustomFoodFields};
use crate::foods::repo_types::{Food, NewFood};
use crate::meals::repo_types::{Meal, MealDraft, MealItems};
use crate::nutrition::MacroGoals;
use crate::tenant::Owner;
use crate::weights::repo_types::{WeightFields, WeightLog};
use crate::{auth, custom_foods, foods, meals, weights};

/// [`Store`] backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<User>> {
        auth::repo::find_by_external_id(&self.db, external_id).await
    }

    async fn create_user(&self, new: NewUser, targets: MacroGoals) -> anyhow::Result<User> {
        auth::repo::create_with_targets(&self.db, new, targets).await
    }

    async fn find_macro_target(&self, user_id: Uuid) -> anyhow::Result<Option<MacroTarget>> {
        auth::repo::find_target(&self.db, user_id).await
    }

    async fn ensure_macro_target(
        &self,
        user_id: Uuid,
        targets: MacroGoals,
    ) -> anyhow::Result<MacroTarget> {
        auth::repo::ensure_target(&self.db, user_id, targets).await
    }

    async fn get_food(&self, id: Uuid) -> anyhow::Result<Option<Food>> {
        foods::repo::get(&self.db, id).await
    }

    async fn upsert_food(&self, food: NewFood) -> anyhow::Result<Food> {
        foods::repo::upsert(&self.db, food).await
    }

    async fn search_foods(&self, query: &str, limit: i64) -> anyhow::Result<Vec<Food>> {
        foods::repo::search(&self.db, query, limit).await
    }

    async fn list_custom_foods(&self, owner: &Owner) -> anyhow::Result<Vec<CustomFood>> {
        custom_foods::repo::list(&self.db, owner).await
    }

    async fn search_custom_foods(
        &self,
        owner: &Owner,
        query: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<CustomFood>> {
        custom_foods::repo::search(&self.db, owner, query, limit).await
    }

    async fn get_custom_food(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<CustomFood>> {
        custom_foods::repo::get(&self.db, owner, id).await
    }

    async fn create_custom_food(
        &self,
        owner: &Owner,
        fields: CustomFoodFields,
    ) -> anyhow::Result<CustomFood> {
        custom_foods::repo::create(&self.db, owner, fields).await
    }

    async fn update_custom_food(
        &self,
        owner: &Owner,
        id: Uuid,
        fields: CustomFoodFields,
    ) -> anyhow::Result<Option<CustomFood>> {
        custom_foods::repo::update(&self.db, owner, id, fields).await
    }

    async fn delete_custom_food(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
        custom_foods::repo::delete(&self.db, owner, id).await
    }

    async fn list_meals(&self, owner: &Owner, range: TimeRange) -> anyhow::Result<Vec<Meal>> {
        meals::repo::list_in_range(&self.db, owner, range).await
    }

    async fn get_meal(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<Meal>> {
        meals::repo::get(&self.db, owner, id).await
    }

    async fn create_meal(
        &self,
        owner: &Owner,
        draft: MealDraft,
        items: MealItems,
    ) -> anyhow::Result<Meal> {
        meals::repo::create(&self.db, owner, draft, items).await
    }

    async fn update_meal(
        &self,
        owner: &Owner,
        id: Uuid,
        draft: MealDraft,
        items: Option<MealItems>,
    ) -> anyhow::Result<Option<Meal>> {
        meals::repo::update(&self.db, owner, id, draft, items).await
    }

    async fn delete_meal(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
        meals::repo::delete(&self.db, owner, id).await
    }

    async fn meal_times(
        &self,
        owner: &Owner,
        range: TimeRange,
    ) -> anyhow::Result<Vec<OffsetDateTime>> {
        meals::repo::logged_times(&self.db, owner, range).await
    }

    async fn recent_weights(&self, owner: &Owner, limit: i64) -> anyhow::Result<Vec<WeightLog>> {
        weights::repo::recent(&self.db, owner, limit).await
    }

    async fn weight_history(&self, owner: &Owner) -> anyhow::Result<Vec<WeightLog>> {
        weights::repo::history(&self.db, owner).await
    }

    async fn get_weight(&self, owner: &Owner, id: Uuid) -> anyhow::Result<Option<WeightLog>> {
        weights::repo::get(&self.db, owner, id).await
    }

    async fn create_weight(
        &self,
        owner: &Owner,
        fields: WeightFields,
    ) -> anyhow::Result<WeightLog> {
        weights::repo::create(&self.db, owner, fields).await
    }

    async fn update_weight(
        &self,
        owner: &Owner,
        id: Uuid,
        fields: WeightFields,
    ) -> anyhow::Result<Option<WeightLog>> {
        weights::repo::update(&self.db, owner, id, fields).await
    }

    async fn delete_weight(&self, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
        weights::repo::delete(&self.db, owner, id).await
    }
}
