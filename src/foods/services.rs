use tracing::info;

use crate::foods::repo_types::NewFood;
use crate::store::Store;

/// Upserts the development staples. Safe to run on every start.
pub async fn ensure_staples(store: &dyn Store) -> anyhow::Result<usize> {
    let staples = NewFood::staples();
    let count = staples.len();
    for food in staples {
        store.upsert_food(food).await?;
    }
    info!(count, "staple foods ensured");
    Ok(count)
}
