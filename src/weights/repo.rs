use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::tenant::Owner;
use crate::weights::repo_types::{WeightFields, WeightLog};

const WEIGHT_COLUMNS: &str = "id, user_id, experience_id, weight_lbs, recorded_for, note";

pub async fn recent(db: &PgPool, owner: &Owner, limit: i64) -> anyhow::Result<Vec<WeightLog>> {
    let rows = sqlx::query_as::<_, WeightLog>(&format!(
        r#"
        SELECT {WEIGHT_COLUMNS}
        FROM weight_logs
        WHERE user_id = $1 AND experience_id IS NOT DISTINCT FROM $2
        ORDER BY recorded_for DESC
        LIMIT $3
        "#
    ))
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn history(db: &PgPool, owner: &Owner) -> anyhow::Result<Vec<WeightLog>> {
    let rows = sqlx::query_as::<_, WeightLog>(&format!(
        r#"
        SELECT {WEIGHT_COLUMNS}
        FROM weight_logs
        WHERE user_id = $1 AND experience_id IS NOT DISTINCT FROM $2
        ORDER BY recorded_for ASC
        "#
    ))
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, owner: &Owner, id: Uuid) -> anyhow::Result<Option<WeightLog>> {
    let row = sqlx::query_as::<_, WeightLog>(&format!(
        r#"
        SELECT {WEIGHT_COLUMNS}
        FROM weight_logs
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

pub async fn create(db: &PgPool, owner: &Owner, fields: WeightFields) -> anyhow::Result<WeightLog> {
    let row = sqlx::query_as::<_, WeightLog>(&format!(
        r#"
        INSERT INTO weight_logs (id, user_id, experience_id, weight_lbs, recorded_for, note)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {WEIGHT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(fields.weight_lbs)
    .bind(fields.recorded_for)
    .bind(&fields.note)
    .fetch_one(db)
    .await
    .context("insert weight log")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    owner: &Owner,
    id: Uuid,
    fields: WeightFields,
) -> anyhow::Result<Option<WeightLog>> {
    let row = sqlx::query_as::<_, WeightLog>(&format!(
        r#"
        UPDATE weight_logs
        SET weight_lbs = $4, recorded_for = $5, note = $6
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        RETURNING {WEIGHT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .bind(fields.weight_lbs)
    .bind(fields.recorded_for)
    .bind(&fields.note)
    .fetch_optional(db)
    .await
    .context("update weight log")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, owner: &Owner, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM weight_logs
        WHERE id = $1 AND user_id = $2 AND experience_id IS NOT DISTINCT FROM $3
        "#,
    )
    .bind(id)
    .bind(owner.user_id)
    .bind(owner.tenant.as_deref())
    .execute(db)
    .await
    .context("delete weight log")?;
    Ok(result.rows_affected() > 0)
}
