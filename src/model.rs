//! This module defines the shared application state.
//! One `AppState` is built at startup and hands out a [`QuestSession`] per
//! opened quest.

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::database::QuestStore;
use crate::database::models::{Quest, QuestId, Task, UserId};
use crate::error::EngineError;
use crate::identity::IdentityProvider;
use crate::mastery::leveling::Mastery;
use crate::mastery::streak::Frequency;
use crate::services::authoring::{self, PresetQuest};
use crate::services::cache::LocalCache;
use crate::services::{QuestSession, SessionDeps};
use std::sync::Arc;
use tracing::info;

/// The central, shared state of the application.
pub struct AppState {
    /// Authoritative remote store.
    pub store: Arc<dyn QuestStore>,
    /// Local snapshot cache.
    pub cache: Arc<dyn LocalCache>,
    pub clock: Arc<dyn Clock>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: EngineConfig,
}

impl AppState {
    fn deps(&self) -> SessionDeps {
        SessionDeps {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }

    /// Creates a session for `quest_id`. Call [`QuestSession::open`] to load it.
    pub fn session(&self, quest_id: QuestId) -> Result<QuestSession, EngineError> {
        QuestSession::new(self.deps(), self.identity.as_ref(), quest_id)
    }

    pub async fn create_quest(
        &self,
        name: &str,
        frequency: Option<Frequency>,
    ) -> Result<Quest, EngineError> {
        let user_id = self.user_id()?;
        let new_quest = authoring::new_quest(name, frequency, self.clock.today())?;
        let quest = self.store.insert_quest(user_id, &new_quest).await?;
        info!(target = "quest.create", quest_id = %quest.id, frequency = %quest.frequency, "quest created");
        Ok(quest)
    }

    /// Adds a quest from a template, then its starter tasks. Tasks are inserted
    /// last-to-first so the newest-first listing shows them in template order.
    pub async fn create_quest_from_preset(
        &self,
        preset: &PresetQuest,
    ) -> Result<(Quest, Vec<Task>), EngineError> {
        let user_id = self.user_id()?;
        let (new_quest, task_names) = authoring::from_preset(preset, self.clock.today())?;
        let quest = self.store.insert_quest(user_id, &new_quest).await?;

        let mut tasks = Vec::with_capacity(task_names.len());
        for name in task_names.iter().rev() {
            tasks.push(self.store.insert_task(user_id, quest.id, name).await?);
        }
        tasks.reverse();
        info!(
            target = "quest.create",
            quest_id = %quest.id,
            preset = %preset.name,
            tasks = tasks.len(),
            "quest created from preset"
        );
        Ok((quest, tasks))
    }

    /// The account-wide mastery track, as persisted.
    pub async fn account_mastery(&self) -> Result<Mastery, EngineError> {
        let user_id = self.user_id()?;
        Ok(self.store.fetch_profile_mastery(user_id).await?)
    }

    fn user_id(&self) -> Result<UserId, EngineError> {
        self.identity
            .current_user()
            .ok_or(EngineError::NotAuthenticated)
    }
}
