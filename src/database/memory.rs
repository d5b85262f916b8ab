//! In-process [`QuestStore`] with per-operation fault injection.
//! Used by the test suite and by local demos without a database.

use super::models::{NewQuest, Quest, QuestId, QuestProgressUpdate, Task, TaskId, UserId};
use super::store::{QuestStore, StoreError};
use crate::mastery::leveling::Mastery;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifies one store call, for fault injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FetchQuest,
    FetchTasks,
    UpdateQuest,
    SetTaskCompleted,
    InsertTask,
    InsertQuest,
    FetchProfile,
    UpdateProfile,
}

#[derive(Default)]
struct Tables {
    quests: HashMap<QuestId, Quest>,
    tasks: Vec<Task>,
    profiles: HashMap<UserId, Mastery>,
    failing: HashSet<StoreOp>,
    calls: HashMap<StoreOp, usize>,
}

impl Tables {
    fn enter(&mut self, op: StoreOp) -> Result<(), StoreError> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} failed")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_quest(&self, quest: Quest) {
        self.tables.write().await.quests.insert(quest.id, quest);
    }

    pub async fn put_task(&self, task: Task) {
        let mut t = self.tables.write().await;
        t.tasks.retain(|existing| existing.id != task.id);
        t.tasks.push(task);
    }

    /// Seeds a task with an explicit creation time.
    pub async fn seed_task(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        name: &str,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Task {
        let task = Task {
            id: Uuid::new_v4(),
            quest_id,
            user_id,
            name: name.to_string(),
            completed,
            created_at,
        };
        self.put_task(task.clone()).await;
        task
    }

    pub async fn put_profile(&self, user_id: UserId, mastery: Mastery) {
        self.tables.write().await.profiles.insert(user_id, mastery);
    }

    pub async fn quest(&self, quest_id: QuestId) -> Option<Quest> {
        self.tables.read().await.quests.get(&quest_id).cloned()
    }

    pub async fn profile(&self, user_id: UserId) -> Option<Mastery> {
        self.tables.read().await.profiles.get(&user_id).copied()
    }

    /// Makes every subsequent `op` call fail until [`MemoryStore::heal`].
    pub async fn fail(&self, op: StoreOp) {
        self.tables.write().await.failing.insert(op);
    }

    pub async fn heal(&self, op: StoreOp) {
        self.tables.write().await.failing.remove(&op);
    }

    pub async fn calls(&self, op: StoreOp) -> usize {
        self.tables.read().await.calls.get(&op).copied().unwrap_or(0)
    }
}

#[async_trait]
impl QuestStore for MemoryStore {
    async fn fetch_quest(&self, user_id: UserId, quest_id: QuestId) -> Result<Quest, StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::FetchQuest)?;
        t.quests
            .get(&quest_id)
            .filter(|q| q.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound("quest"))
    }

    async fn fetch_tasks(
        &self,
        user_id: UserId,
        quest_id: QuestId,
    ) -> Result<Vec<Task>, StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::FetchTasks)?;
        let mut tasks: Vec<Task> = t
            .tasks
            .iter()
            .filter(|task| task.quest_id == quest_id && task.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_quest_progress(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        update: &QuestProgressUpdate,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::UpdateQuest)?;
        let quest = t
            .quests
            .get_mut(&quest_id)
            .filter(|q| q.user_id == user_id)
            .ok_or(StoreError::NotFound("quest"))?;
        quest.apply(update);
        Ok(())
    }

    async fn set_task_completed(
        &self,
        user_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::SetTaskCompleted)?;
        let task = t
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id && task.user_id == user_id)
            .ok_or(StoreError::NotFound("task"))?;
        task.completed = completed;
        Ok(())
    }

    async fn insert_task(
        &self,
        user_id: UserId,
        quest_id: QuestId,
        name: &str,
    ) -> Result<Task, StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::InsertTask)?;
        if !t.quests.get(&quest_id).is_some_and(|q| q.user_id == user_id) {
            return Err(StoreError::NotFound("quest"));
        }
        // creation times stay strictly increasing so newest-first order is stable
        let latest = t.tasks.iter().map(|task| task.created_at).max();
        let now = Utc::now();
        let created_at = match latest {
            Some(last) if last >= now => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        let task = Task {
            id: Uuid::new_v4(),
            quest_id,
            user_id,
            name: name.to_string(),
            completed: false,
            created_at,
        };
        t.tasks.push(task.clone());
        Ok(task)
    }

    async fn insert_quest(&self, user_id: UserId, new: &NewQuest) -> Result<Quest, StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::InsertQuest)?;
        let quest = Quest {
            id: Uuid::new_v4(),
            user_id,
            name: new.name.clone(),
            frequency: new.frequency.clone(),
            streak: 0,
            failed_at: None,
            due_date: Some(new.due_date),
            last_completed_at: None,
            mastery: Mastery::default(),
        };
        t.quests.insert(quest.id, quest.clone());
        Ok(quest)
    }

    async fn fetch_profile_mastery(&self, user_id: UserId) -> Result<Mastery, StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::FetchProfile)?;
        t.profiles
            .get(&user_id)
            .copied()
            .ok_or(StoreError::NotFound("profile"))
    }

    async fn update_profile_mastery(
        &self,
        user_id: UserId,
        mastery: Mastery,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        t.enter(StoreOp::UpdateProfile)?;
        let profile = t
            .profiles
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("profile"))?;
        *profile = mastery;
        Ok(())
    }
}
