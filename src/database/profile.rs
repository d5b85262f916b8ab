//! Account-wide mastery columns of the `profiles` table.
//! Display fields (username, website) are not touched here.

use super::DbPool;
use super::models::{ProfileMasteryRow, UserId};
use crate::mastery::leveling::Mastery;
use tracing::instrument;

#[instrument(level = "debug", skip(pool), fields(user_id = %user_id))]
pub async fn get_profile_mastery(
    pool: &DbPool,
    user_id: UserId,
) -> Result<Option<Mastery>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProfileMasteryRow>("SELECT xp, level FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Mastery::from))
}

#[instrument(level = "debug", skip(pool), fields(user_id = %user_id, level = mastery.level))]
pub async fn update_profile_mastery(
    pool: &DbPool,
    user_id: UserId,
    mastery: Mastery,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE profiles SET xp = $2, level = $3 WHERE id = $1")
        .bind(user_id)
        .bind(mastery.xp)
        .bind(mastery.level)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
