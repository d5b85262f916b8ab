//! The remote store contract the engine talks to.

use super::models::{NewQuest, Quest, QuestId, QuestProgressUpdate, Task, TaskId, UserId};
use crate::mastery::leveling::Mastery;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row-oriented remote persistence. Every call is atomic for one row only and
/// is scoped to the given user.
#[async_trait]
pub trait QuestStore: Send + Sync {
    async fn fetch_quest(&self, user_id: UserId, quest_id: QuestId) -> Result<Quest, StoreError>;

    /// Tasks of a quest, newest first.
    async fn fetch_tasks(&self, user_id: UserId, quest_id: QuestId)
    -> Result<Vec<Task>, StoreError>;

    async fn update_quest_progress(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        update: &QuestProgressUpdate,
    ) -> Result<(), StoreError>;

    async fn set_task_completed(
        &self,
        user_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), StoreError>;

    async fn insert_task(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        name: &str,
    ) -> Result<Task, StoreError>;

    async fn insert_quest(&self, user_id: UserId, quest: &NewQuest) -> Result<Quest, StoreError>;

    async fn fetch_profile_mastery(&self, user_id: UserId) -> Result<Mastery, StoreError>;

    async fn update_profile_mastery(
        &self,
        user_id: UserId,
        mastery: Mastery,
    ) -> Result<(), StoreError>;
}
