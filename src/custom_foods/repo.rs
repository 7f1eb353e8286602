use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::custom_foods::repo_types::{CustomFood, CustomFoodFields};
use crate::foods::repo::like_pattern;
use crate::tenant::Owner;

const CUSTOM_FOOD_COLUMNS: &str = "id, user_id, experience_id, name, brand, serving_size, \
     serving_unit, protein_per_unit, carbs_per_unit, fats_per_unit, calories_per_unit, updated_at";

pub async fn list(db: &PgPool, owner: &Owner) -> anyhow::Result<Vec<CustomFood>> {
    let rows = sqlx::query_as::<_, CustomFood>(&format!(
        r#"
        SELECT {CUSTOM_FOOD_COLUMNS}
        FROM custom_foods
        WHERE user_id = $1 AND experience_id IS NOT DISTINCT FROM $2
        ORDER BY updated_at DESC
        "#
    ))
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn search(
    db: &PgPool,
    owner: &Owner,
    query: &str,
    limit: i64,
) -> anyhow::Result<Vec<CustomFood>> {
    let rows = sqlx::query_as::<_, CustomFood>(&format!(
        r#"
        SELECT {CUSTOM_FOOD_COLUMNS}
        FROM custom_foods
        WHERE user_id = $1 AND experience_id IS NOT DISTINCT FROM $2
          AND ($3 = '' OR name ILIKE $4 OR brand ILIKE $4)
        ORDER BY name ASC
        LIMIT $5
        "#
    ))
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(query)
    .bind(like_pattern(query))
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, owner: &Owner, id: Uuid) -> anyhow::Result<Option<CustomFood>> {
    let row = sqlx::query_as::<_, CustomFood>(&format!(
        r#"
        SELECT {CUSTOM_FOOD_COLUMNS}
        FROM custom_foods
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        "#
    ))
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    owner: &Owner,
    fields: CustomFoodFields,
) -> anyhow::Result<CustomFood> {
    let row = sqlx::query_as::<_, CustomFood>(&format!(
        r#"
        INSERT INTO custom_foods (id, user_id, experience_id, name, brand, serving_size,
                                  serving_unit, protein_per_unit, carbs_per_unit,
                                  fats_per_unit, calories_per_unit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {CUSTOM_FOOD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(&fields.name)
    .bind(&fields.brand)
    .bind(fields.serving_size)
    .bind(&fields.serving_unit)
    .bind(fields.macros.protein)
    .bind(fields.macros.carbs)
    .bind(fields.macros.fats)
    .bind(fields.macros.calories)
    .fetch_one(db)
    .await
    .context("insert custom food")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    owner: &Owner,
    id: Uuid,
    fields: CustomFoodFields,
) -> anyhow::Result<Option<CustomFood>> {
    let row = sqlx::query_as::<_, CustomFood>(&format!(
        r#"
        UPDATE custom_foods
        SET name = $4, brand = $5, serving_size = $6, serving_unit = $7,
            protein_per_unit = $8, carbs_per_unit = $9, fats_per_unit = $10,
            calories_per_unit = $11, updated_at = now()
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        RETURNING {CUSTOM_FOOD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(&fields.name)
    .bind(&fields.brand)
    .bind(fields.serving_size)
    .bind(&fields.serving_unit)
    .bind(fields.macros.protein)
    .bind(fields.macros.carbs)
    .bind(fields.macros.fats)
    .bind(fields.macros.calories)
    .fetch_optional(db)
    .await
    .context("update custom food")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM custom_foods
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        "#,
    )
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .execute(db)
    .await
    .context("delete custom food")?;
    Ok(result.rows_affected() > 0)
}
