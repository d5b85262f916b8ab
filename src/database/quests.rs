//! Contains all database functions related to the `quests` table.

use super::DbPool;
use super::models::{NewQuest, Quest, QuestId, QuestProgressUpdate, QuestRow, UserId};
use tracing::instrument;

const QUEST_COLUMNS: &str = "id, user_id, name, frequency, streak, failed_at, due_date, \
     last_completed_at, mastery_lvl, mastery_xp";

/// Loads one quest owned by `user_id`.
#[instrument(level = "debug", skip(pool), fields(quest_id = %quest_id))]
pub async fn get_quest(
    pool: &DbPool,
    user_id: UserId,
    quest_id: QuestId,
) -> Result<Option<Quest>, sqlx::Error> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests WHERE id = $1 AND user_id = $2"
    ))
    .bind(quest_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Quest::from))
}

/// Writes the streak, due date and mastery columns. Returns the affected row count.
#[instrument(level = "debug", skip(pool, update), fields(quest_id = %quest_id, streak = update.streak))]
pub async fn update_quest_progress(
    pool: &DbPool,
    user_id: UserId,
    quest_id: QuestId,
    update: &QuestProgressUpdate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE quests
           SET streak = $3, failed_at = $4, last_completed_at = $5,
               mastery_xp = $6, mastery_lvl = $7, due_date = $8
           WHERE id = $1 AND user_id = $2"#,
    )
    .bind(quest_id)
    .bind(user_id)
    .bind(update.streak)
    .bind(update.failed_at)
    .bind(update.last_completed_at)
    .bind(update.mastery.xp)
    .bind(update.mastery.level)
    .bind(update.due_date)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[instrument(level = "debug", skip(pool, quest), fields(name = %quest.name))]
pub async fn insert_quest(
    pool: &DbPool,
    user_id: UserId,
    quest: &NewQuest,
) -> Result<Quest, sqlx::Error> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        r#"INSERT INTO quests (id, user_id, name, frequency, streak, due_date, mastery_lvl, mastery_xp)
           VALUES (gen_random_uuid(), $1, $2, $3, 0, $4, 1, 0)
           RETURNING {QUEST_COLUMNS}"#
    ))
    .bind(user_id)
    .bind(&quest.name)
    .bind(quest.frequency.to_string())
    .bind(quest.due_date)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}
