//! Contains all database functions related to the `tasks` table.

use super::DbPool;
use super::models::{QuestId, Task, TaskId, UserId};
use tracing::instrument;

/// Tasks of a quest in display order (newest first).
#[instrument(level = "debug", skip(pool), fields(quest_id = %quest_id))]
pub async fn get_quest_tasks(
    pool: &DbPool,
    user_id: UserId,
    quest_id: QuestId,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"SELECT id, quest_id, user_id, name, completed, created_at
           FROM tasks WHERE quest_id = $1 AND user_id = $2
           ORDER BY created_at DESC"#,
    )
    .bind(quest_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[instrument(level = "debug", skip(pool), fields(task_id = %task_id, completed = completed))]
pub async fn set_task_completed(
    pool: &DbPool,
    user_id: UserId,
    task_id: TaskId,
    completed: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE tasks SET completed = $3 WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .bind(completed)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[instrument(level = "debug", skip(pool), fields(quest_id = %quest_id))]
pub async fn insert_task(
    pool: &DbPool,
    user_id: UserId,
    quest_id: QuestId,
    name: &str,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"INSERT INTO tasks (id, quest_id, user_id, name, completed, created_at)
           VALUES (gen_random_uuid(), $1, $2, $3, FALSE, NOW())
           RETURNING id, quest_id, user_id, name, completed, created_at"#,
    )
    .bind(quest_id)
    .bind(user_id)
    .bind(name)
    .fetch_one(pool)
    .await
}
