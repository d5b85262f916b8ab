//! Shared fixtures for session tests.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use questkeeper::clock::FixedClock;
use questkeeper::config::EngineConfig;
use questkeeper::database::MemoryStore;
use questkeeper::database::models::{Quest, Task, UserId};
use questkeeper::identity::StaticIdentity;
use questkeeper::mastery::{Frequency, Mastery};
use questkeeper::services::cache::MemoryCache;
use questkeeper::services::{QuestSession, SessionDeps};
use std::sync::Arc;
use uuid::Uuid;

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<FixedClock>,
    pub user_id: UserId,
    pub quest: Quest,
    pub config: EngineConfig,
}

impl Harness {
    /// A daily quest due on `due`, with the clock set to `today`.
    pub async fn new(today: &str, due: &str) -> Self {
        let user_id = Uuid::new_v4();
        let quest = Quest {
            id: Uuid::new_v4(),
            user_id,
            name: "Morning routine".into(),
            frequency: Frequency::Daily,
            streak: 2,
            failed_at: None,
            due_date: Some(d(due)),
            last_completed_at: None,
            mastery: Mastery::new(1, 10),
        };
        let store = Arc::new(MemoryStore::new());
        store.put_quest(quest.clone()).await;
        store.put_profile(user_id, Mastery::new(1, 0)).await;
        Self {
            store,
            cache: Arc::new(MemoryCache::new()),
            clock: Arc::new(FixedClock::on(d(today))),
            user_id,
            quest,
            config: EngineConfig::default(),
        }
    }

    pub async fn update_quest(&mut self, edit: impl FnOnce(&mut Quest)) {
        edit(&mut self.quest);
        self.store.put_quest(self.quest.clone()).await;
    }

    /// Seeds tasks oldest first, one minute apart.
    pub async fn seed_tasks(&self, states: &[bool]) -> Vec<Task> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let mut out = Vec::new();
        for (i, done) in states.iter().enumerate() {
            let task = self
                .store
                .seed_task(
                    self.user_id,
                    self.quest.id,
                    &format!("task {i}"),
                    *done,
                    base + Duration::minutes(i as i64),
                )
                .await;
            out.push(task);
        }
        out
    }

    pub fn deps(&self) -> SessionDeps {
        SessionDeps {
            store: self.store.clone(),
            cache: self.cache.clone(),
            clock: self.clock.clone(),
            config: self.config,
        }
    }

    pub fn session(&self) -> QuestSession {
        QuestSession::new(self.deps(), &StaticIdentity(Some(self.user_id)), self.quest.id).unwrap()
    }
}
