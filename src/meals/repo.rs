use std::collections::HashMap;

use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::repo_types::{Meal, MealDraft, MealFood, MealFoodRow, MealItems, MealRow};
use crate::store::TimeRange;
use crate::tenant::Owner;

const MEAL_COLUMNS: &str =
    "id, user_id, experience_id, name, logged_at, notes, protein, carbs, fats";

pub async fn list_in_range(
    db: &PgPool,
    owner: &Owner,
    range: TimeRange,
) -> anyhow::Result<Vec<Meal>> {
    let rows = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE user_id = $1 AND experience_id IS NOT DISTINCT FROM $2
          AND logged_at >= $3 AND logged_at < $4
        ORDER BY logged_at ASC
        "#
    ))
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(range.start)
    .bind(range.end)
    .fetch_all(db)
    .await?;

    attach_foods(db, rows).await
}

pub async fn get(db: &PgPool, owner: &Owner, id: Uuid) -> anyhow::Result<Option<Meal>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        "#
    ))
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => Ok(attach_foods(db, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub async fn logged_times(
    db: &PgPool,
    owner: &Owner,
    range: TimeRange,
) -> anyhow::Result<Vec<OffsetDateTime>> {
    let rows: Vec<(OffsetDateTime,)> = sqlx::query_as(
        r#"
        SELECT logged_at
        FROM meals
        WHERE user_id = $1 AND experience_id IS NOT DISTINCT FROM $2
          AND logged_at >= $3 AND logged_at < $4
        "#,
    )
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(range.start)
    .bind(range.end)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

pub async fn create(
    db: &PgPool,
    owner: &Owner,
    draft: MealDraft,
    items: MealItems,
) -> anyhow::Result<Meal> {
    let meal_id = Uuid::new_v4();
    let mut tx = db.begin().await.context("begin tx")?;

    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        INSERT INTO meals (id, user_id, experience_id, name, logged_at, notes, protein, carbs, fats)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(meal_id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(&draft.name)
    .bind(draft.logged_at)
    .bind(&draft.notes)
    .bind(items.totals.protein)
    .bind(items.totals.carbs)
    .bind(items.totals.fats)
    .fetch_one(&mut *tx)
    .await
    .context("insert meal")?;

    let foods = insert_foods_tx(&mut tx, meal_id, &items).await?;
    tx.commit().await.context("commit tx")?;
    Ok(row.into_meal(foods))
}

pub async fn update(
    db: &PgPool,
    owner: &Owner,
    id: Uuid,
    draft: MealDraft,
    items: Option<MealItems>,
) -> anyhow::Result<Option<Meal>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        UPDATE meals
        SET name = $4, logged_at = $5, notes = $6,
            protein = COALESCE($7, protein),
            carbs = COALESCE($8, carbs),
            fats = COALESCE($9, fats),
            updated_at = now()
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(&draft.name)
    .bind(draft.logged_at)
    .bind(&draft.notes)
    .bind(items.as_ref().map(|i| i.totals.protein))
    .bind(items.as_ref().map(|i| i.totals.carbs))
    .bind(items.as_ref().map(|i| i.totals.fats))
    .fetch_optional(&mut *tx)
    .await
    .context("update meal")?;

    let Some(row) = row else {
        return Ok(None);
    };

    if let Some(items) = &items {
        sqlx::query("DELETE FROM meal_foods WHERE meal_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("clear meal foods")?;
        insert_foods_tx(&mut tx, id, items).await?;
    }
    tx.commit().await.context("commit tx")?;

    Ok(attach_foods(db, vec![row]).await?.pop())
}

/// Line items go with the meal through `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM meals
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        "#,
    )
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .execute(db)
    .await
    .context("delete meal")?;
    Ok(result.rows_affected() > 0)
}

async fn insert_foods_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: Uuid,
    items: &MealItems,
) -> anyhow::Result<Vec<MealFood>> {
    let mut foods = Vec::with_capacity(items.items.len());
    for (position, item) in items.items.iter().enumerate() {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO meal_foods (id, meal_id, position, source, food_id, custom_food_id,
                                    name, brand, serving_unit, quantity,
                                    protein, carbs, fats, calories)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(id)
        .bind(meal_id)
        .bind(position as i32)
        .bind(item.source.label())
        .bind(item.source.food_id())
        .bind(item.source.custom_food_id())
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.serving_unit)
        .bind(item.quantity)
        .bind(item.protein)
        .bind(item.carbs)
        .bind(item.fats)
        .bind(item.calories)
        .execute(&mut **tx)
        .await
        .context("insert meal food")?;
        foods.push(MealFood {
            id,
            snapshot: item.clone(),
        });
    }
    Ok(foods)
}

async fn attach_foods(db: &PgPool, rows: Vec<MealRow>) -> anyhow::Result<Vec<Meal>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let food_rows = sqlx::query_as::<_, MealFoodRow>(
        r#"
        SELECT id, meal_id, source, food_id, custom_food_id, name, brand, serving_unit,
               quantity, protein, carbs, fats, calories
        FROM meal_foods
        WHERE meal_id = ANY($1)
        ORDER BY meal_id, position ASC
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;

    let mut by_meal: HashMap<Uuid, Vec<MealFood>> = HashMap::new();
    for r in food_rows {
        let meal_id = r.meal_id;
        by_meal.entry(meal_id).or_default().push(MealFood::try_from(r)?);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let foods = by_meal.remove(&row.id).unwrap_or_default();
            row.into_meal(foods)
        })
        .collect())
}
