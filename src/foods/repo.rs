use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::foods::repo_types::{Food, NewFood};

const FOOD_COLUMNS: &str = "id, external_id, source, name, brand, serving_size, serving_unit, \
     protein_per_unit, carbs_per_unit, fats_per_unit, calories_per_unit";

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Food>> {
    let food = sqlx::query_as::<_, Food>(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(food)
}

/// Idempotent on `external_id`.
pub async fn upsert(db: &PgPool, food: NewFood) -> anyhow::Result<Food> {
    let row = sqlx::query_as::<_, Food>(&format!(
        r#"
        INSERT INTO foods (id, external_id, name, brand, serving_size, serving_unit,
                           protein_per_unit, carbs_per_unit, fats_per_unit, calories_per_unit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (external_id) DO UPDATE SET
            name = EXCLUDED.name,
            brand = EXCLUDED.brand,
            serving_size = EXCLUDED.serving_size,
            serving_unit = EXCLUDED.serving_unit,
            protein_per_unit = EXCLUDED.protein_per_unit,
            carbs_per_unit = EXCLUDED.carbs_per_unit,
            fats_per_unit = EXCLUDED.fats_per_unit,
            calories_per_unit = EXCLUDED.calories_per_unit,
            updated_at = now()
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&food.external_id)
    .bind(&food.name)
    .bind(&food.brand)
    .bind(food.serving_size)
    .bind(&food.serving_unit)
    .bind(food.macros.protein)
    .bind(food.macros.carbs)
    .bind(food.macros.fats)
    .bind(food.macros.calories)
    .fetch_one(db)
    .await
    .with_context(|| format!("upsert food {}", food.external_id))?;
    Ok(row)
}

/// Case-insensitive match on name or brand; an empty query lists by name.
pub async fn search(db: &PgPool, query: &str, limit: i64) -> anyhow::Result<Vec<Food>> {
    let rows = sqlx::query_as::<_, Food>(&format!(
        r#"
        SELECT {FOOD_COLUMNS}
        FROM foods
        WHERE $1 = '' OR name ILIKE $2 OR brand ILIKE $2
        ORDER BY name ASC
        LIMIT $3
        "#
    ))
    .bind(query)
    .bind(like_pattern(query))
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// `%query%` with LIKE metacharacters escaped.
pub fn like_pattern(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    out.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
