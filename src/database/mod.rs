//! This module acts as a central hub for all persistence-related logic.
//! The engine only sees the [`QuestStore`] trait; [`PgStore`] is the Postgres
//! implementation and [`MemoryStore`] an in-process one.

pub mod memory;
pub mod models;
pub mod profile;
pub mod quests;
pub mod store;
pub mod tasks;

use crate::mastery::leveling::Mastery;
use async_trait::async_trait;
use models::{NewQuest, Quest, QuestId, QuestProgressUpdate, Task, TaskId, UserId};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub use memory::{MemoryStore, StoreOp};
pub use store::{QuestStore, StoreError};

/// A type alias for the database connection pool (`Pool<Postgres>`).
pub type DbPool = Pool<Postgres>;

/// Postgres-backed [`QuestStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl QuestStore for PgStore {
    async fn fetch_quest(&self, user_id: UserId, quest_id: QuestId) -> Result<Quest, StoreError> {
        quests::get_quest(&self.pool, user_id, quest_id)
            .await?
            .ok_or(StoreError::NotFound("quest"))
    }

    async fn fetch_tasks(
        &self,
        user_id: UserId,
        quest_id: QuestId,
    ) -> Result<Vec<Task>, StoreError> {
        Ok(tasks::get_quest_tasks(&self.pool, user_id, quest_id).await?)
    }

    async fn update_quest_progress(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        update: &QuestProgressUpdate,
    ) -> Result<(), StoreError> {
        match quests::update_quest_progress(&self.pool, user_id, quest_id, update).await? {
            0 => Err(StoreError::NotFound("quest")),
            _ => Ok(()),
        }
    }

    async fn set_task_completed(
        &self,
        user_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), StoreError> {
        match tasks::set_task_completed(&self.pool, user_id, task_id, completed).await? {
            0 => Err(StoreError::NotFound("task")),
            _ => Ok(()),
        }
    }

    async fn insert_task(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        name: &str,
    ) -> Result<Task, StoreError> {
        Ok(tasks::insert_task(&self.pool, user_id, quest_id, name).await?)
    }

    async fn insert_quest(&self, user_id: UserId, quest: &NewQuest) -> Result<Quest, StoreError> {
        Ok(quests::insert_quest(&self.pool, user_id, quest).await?)
    }

    async fn fetch_profile_mastery(&self, user_id: UserId) -> Result<Mastery, StoreError> {
        profile::get_profile_mastery(&self.pool, user_id)
            .await?
            .ok_or(StoreError::NotFound("profile"))
    }

    async fn update_profile_mastery(
        &self,
        user_id: UserId,
        mastery: Mastery,
    ) -> Result<(), StoreError> {
        match profile::update_profile_mastery(&self.pool, user_id, mastery).await? {
            0 => Err(StoreError::NotFound("profile")),
            _ => Ok(()),
        }
    }
}
