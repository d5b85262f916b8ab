//! Local key-value cache for per-quest task snapshots.
//! Keys follow `tasks-{quest_id}` (JSON task array) and `last_check_date-{quest_id}`
//! (ISO date). The cache is never a source of truth: any read that fails or does
//! not parse is a miss.
use crate::constants::{LAST_CHECK_CACHE_PREFIX, TASKS_CACHE_PREFIX};
use crate::database::models::{QuestId, Task};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

static HIT_COUNTER: AtomicU64 = AtomicU64::new(0);
static MISS_COUNTER: AtomicU64 = AtomicU64::new(0);

fn record(hit: bool) {
    let counter = if hit { &HIT_COUNTER } else { &MISS_COUNTER };
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Expose counters for diagnostics (hit, miss).
pub fn cache_stats() -> (u64, u64) {
    (
        HIT_COUNTER.load(Ordering::Relaxed),
        MISS_COUNTER.load(Ordering::Relaxed),
    )
}

pub fn tasks_key(quest_id: QuestId) -> String {
    format!("{TASKS_CACHE_PREFIX}{quest_id}")
}

pub fn last_check_key(quest_id: QuestId) -> String {
    format!("{LAST_CHECK_CACHE_PREFIX}{quest_id}")
}

/// String key-value storage. Writes are fire-and-forget.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str);
}

#[derive(Default)]
pub struct MemoryCache {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.map.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.map
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

/// One file per key under a directory.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.cache"))
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn get(&self, key: &str) -> Option<String> {
        tokio::fs::read_to_string(self.path_for(key)).await.ok()
    }

    async fn set(&self, key: &str, value: &str) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(target = "cache.file", dir = %self.dir.display(), error = %e, "create dir failed");
            return;
        }
        if let Err(e) = tokio::fs::write(self.path_for(key), value).await {
            warn!(target = "cache.file", key, error = %e, "write failed");
        }
    }
}

/// What the cache holds for one quest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedSnapshot {
    pub tasks: Option<Vec<Task>>,
    pub last_check_date: Option<NaiveDate>,
}

pub async fn read_tasks(cache: &dyn LocalCache, quest_id: QuestId) -> Option<Vec<Task>> {
    let Some(raw) = cache.get(&tasks_key(quest_id)).await else {
        record(false);
        debug!(target = "cache.tasks", %quest_id, hit = false);
        return None;
    };
    match serde_json::from_str::<Vec<Task>>(&raw) {
        Ok(tasks) => {
            record(true);
            debug!(target = "cache.tasks", %quest_id, hit = true, count = tasks.len());
            Some(tasks)
        }
        Err(e) => {
            record(false);
            warn!(target = "cache.tasks", %quest_id, error = %e, "discarding unreadable snapshot");
            None
        }
    }
}

pub async fn write_tasks(cache: &dyn LocalCache, quest_id: QuestId, tasks: &[Task]) {
    match serde_json::to_string(tasks) {
        Ok(json) => cache.set(&tasks_key(quest_id), &json).await,
        Err(e) => warn!(target = "cache.tasks", %quest_id, error = %e, "serialize failed"),
    }
}

pub async fn read_last_check(cache: &dyn LocalCache, quest_id: QuestId) -> Option<NaiveDate> {
    let raw = cache.get(&last_check_key(quest_id)).await?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub async fn mark_checked(cache: &dyn LocalCache, quest_id: QuestId, day: NaiveDate) {
    cache
        .set(&last_check_key(quest_id), &day.format("%Y-%m-%d").to_string())
        .await;
}

pub async fn load_snapshot(cache: &dyn LocalCache, quest_id: QuestId) -> CachedSnapshot {
    CachedSnapshot {
        tasks: read_tasks(cache, quest_id).await,
        last_check_date: read_last_check(cache, quest_id).await,
    }
}
