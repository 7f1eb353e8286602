use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{MacroTarget, NewUser, User};
use crate::nutrition::MacroGoals;

/// Find a user by platform id.
pub async fn find_by_external_id(db: &PgPool, external_id: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, external_id, email, display_name, created_at
        FROM users
        WHERE external_id = $1
        "#,
    )
    .bind(external_id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Create a user and its default macro target in one transaction.
pub async fn create_with_targets(
    db: &PgPool,
    new: NewUser,
    targets: MacroGoals,
) -> anyhow::Result<User> {
    let mut tx = db.begin().await.context("begin tx")?;

    // A concurrent first request may have inserted the row already; the no-op
    // update makes RETURNING yield it either way.
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, external_id, email, display_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (external_id) DO UPDATE SET external_id = EXCLUDED.external_id
        RETURNING id, external_id, email, display_name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.external_id)
    .bind(&new.email)
    .bind(&new.display_name)
    .fetch_one(&mut *tx)
    .await
    .context("insert user")?;

    insert_target(&mut tx, user.id, targets).await?;
    tx.commit().await.context("commit tx")?;
    Ok(user)
}

pub async fn find_target(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<MacroTarget>> {
    let target = sqlx::query_as::<_, MacroTarget>(
        r#"
        SELECT id, user_id, calories, protein, carbs, fats
        FROM macro_targets
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(target)
}

pub async fn ensure_target(
    db: &PgPool,
    user_id: Uuid,
    targets: MacroGoals,
) -> anyhow::Result<MacroTarget> {
    let mut tx = db.begin().await.context("begin tx")?;
    insert_target(&mut tx, user_id, targets).await?;
    tx.commit().await.context("commit tx")?;

    find_target(db, user_id)
        .await?
        .context("macro target missing after insert")
}

async fn insert_target(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    targets: MacroGoals,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO macro_targets (id, user_id, calories, protein, carbs, fats)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(targets.calories)
    .bind(targets.protein)
    .bind(targets.carbs)
    .bind(targets.fats)
    .execute(&mut **tx)
    .await
    .context("insert macro target")?;
    Ok(())
}
