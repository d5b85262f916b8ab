use chrono::Duration;
use pretty_assertions::assert_eq;
use questkeeper::database::StoreOp;
use questkeeper::mastery::Mastery;
use questkeeper::services::cache::{self, FileCache, LocalCache};
use questkeeper::services::reconcile::RolloverStatus;
use questkeeper::services::SessionPhase;

mod common;
use common::{Harness, d};

#[tokio::test]
async fn fetch_failure_keeps_cached_tasks_on_screen() {
    let h = Harness::new("2024-01-10", "2024-01-10").await;
    let seeded = h.seed_tasks(&[true, false]).await;
    let mut first = h.session();
    first.open().await.unwrap();
    let cached = first.tasks().to_vec();
    assert_eq!(cached.len(), seeded.len());

    h.store.fail(StoreOp::FetchTasks).await;
    let mut second = h.session();
    let err = second.open().await.unwrap_err();

    assert!(err.is_recoverable());
    assert_eq!(second.phase(), SessionPhase::Ready);
    assert_eq!(second.tasks(), cached.as_slice());
    assert!(second.view().from_cache);
    assert!(!second.can_submit());
}

#[tokio::test]
async fn fetch_failure_without_cache_is_empty_not_fatal() {
    let h = Harness::new("2024-01-10", "2024-01-10").await;
    h.seed_tasks(&[true]).await;
    h.store.fail(StoreOp::FetchQuest).await;
    let mut session = h.session();

    assert!(session.open().await.is_err());
    assert!(session.tasks().is_empty());
    assert_eq!(session.progress(), 0.0);
}

#[tokio::test]
async fn successful_fetch_overwrites_stale_cache() {
    let h = Harness::new("2024-01-10", "2024-01-10").await;
    let seeded = h.seed_tasks(&[false]).await;
    let mut stale = seeded.clone();
    stale[0].completed = true;
    stale[0].name = "stale".into();
    cache::write_tasks(h.cache.as_ref(), h.quest.id, &stale).await;

    let mut session = h.session();
    let report = session.open().await.unwrap();

    assert!(report.cache_hit);
    assert_eq!(session.tasks(), seeded.as_slice());
    assert_eq!(
        cache::read_tasks(h.cache.as_ref(), h.quest.id).await.unwrap(),
        seeded
    );
}

#[tokio::test]
async fn kept_rollover_runs_once_per_day() {
    let mut h = Harness::new("2024-01-11", "2024-01-10").await;
    h.update_quest(|q| q.last_completed_at = Some(d("2024-01-10")))
        .await;

    let mut session = h.session();
    let report = session.open().await.unwrap();
    assert_eq!(report.rollover, RolloverStatus::Kept { streak: 3 });

    let stored = h.store.quest(h.quest.id).await.unwrap();
    assert_eq!(stored.streak, 3);
    assert_eq!(stored.failed_at, None);
    assert_eq!(stored.due_date, Some(d("2024-01-12")));
    assert_eq!(stored.mastery, Mastery::new(3, 24));
    assert_eq!(session.quest(), Some(&stored));
    assert_eq!(
        cache::read_last_check(h.cache.as_ref(), h.quest.id).await,
        Some(d("2024-01-11"))
    );

    let report = session.on_visible().await.unwrap();
    assert_eq!(report.rollover, RolloverStatus::AlreadyChecked);
    let mut other = h.session();
    assert_eq!(
        other.open().await.unwrap().rollover,
        RolloverStatus::AlreadyChecked
    );
    assert_eq!(h.store.calls(StoreOp::UpdateQuest).await, 1);
}

#[tokio::test]
async fn missed_rollover_resets_streak() {
    let mut h = Harness::new("2024-01-11", "2024-01-10").await;
    h.update_quest(|q| q.last_completed_at = Some(d("2024-01-09")))
        .await;

    let mut session = h.session();
    let report = session.open().await.unwrap();

    assert_eq!(
        report.rollover,
        RolloverStatus::Missed {
            failed_at: d("2024-01-11")
        }
    );
    let stored = h.store.quest(h.quest.id).await.unwrap();
    assert_eq!(stored.streak, 0);
    assert_eq!(stored.failed_at, Some(d("2024-01-11")));
    assert_eq!(stored.last_completed_at, Some(d("2024-01-09")));
}

#[tokio::test]
async fn rollover_xp_can_be_disabled() {
    let mut h = Harness::new("2024-01-11", "2024-01-10").await;
    h.config.rollover_awards_xp = false;
    let mut session = h.session();
    session.open().await.unwrap();

    let stored = h.store.quest(h.quest.id).await.unwrap();
    assert_eq!(stored.mastery, Mastery::new(1, 10));
    assert_eq!(stored.streak, 0);
}

#[tokio::test]
async fn failed_rollover_retries_on_next_open() {
    let mut h = Harness::new("2024-01-11", "2024-01-10").await;
    h.update_quest(|q| q.last_completed_at = Some(d("2024-01-10")))
        .await;
    h.store.fail(StoreOp::UpdateQuest).await;

    let mut session = h.session();
    let report = session.open().await.unwrap();
    assert!(matches!(report.rollover, RolloverStatus::Failed(_)));
    assert_eq!(cache::read_last_check(h.cache.as_ref(), h.quest.id).await, None);

    h.store.heal(StoreOp::UpdateQuest).await;
    let report = session.open().await.unwrap();
    assert_eq!(report.rollover, RolloverStatus::Kept { streak: 3 });
}

#[tokio::test]
async fn next_day_checks_again() {
    let h = Harness::new("2024-01-10", "2024-01-10").await;
    let mut session = h.session();
    assert_eq!(session.open().await.unwrap().rollover, RolloverStatus::NotDue);

    h.clock.advance(Duration::days(1));
    let report = session.on_visible().await.unwrap();

    assert_eq!(
        report.rollover,
        RolloverStatus::Missed {
            failed_at: d("2024-01-11")
        }
    );
}

#[tokio::test]
async fn file_cache_persists_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested");
    let h = Harness::new("2024-01-10", "2024-01-10").await;
    let seeded = h.seed_tasks(&[true, false]).await;

    let first = FileCache::new(&path);
    assert!(first.get("missing").await.is_none());
    cache::write_tasks(&first, h.quest.id, &seeded).await;
    cache::mark_checked(&first, h.quest.id, d("2024-01-10")).await;

    let second = FileCache::new(&path);
    let snapshot = cache::load_snapshot(&second, h.quest.id).await;
    assert_eq!(snapshot.tasks, Some(seeded));
    assert_eq!(snapshot.last_check_date, Some(d("2024-01-10")));
}

/// Counts reads per key on top of a `MemoryCache`.
#[derive(Default)]
struct CountingCache {
    inner: cache::MemoryCache,
    reads: std::sync::Mutex<std::collections::HashMap<String, usize>>,
}

impl CountingCache {
    fn reads_of(&self, key: &str) -> usize {
        self.reads.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl LocalCache for CountingCache {
    async fn get(&self, key: &str) -> Option<String> {
        *self.reads.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) {
        self.inner.set(key, value).await;
    }
}

#[tokio::test]
async fn open_reads_the_check_marker_once() {
    use questkeeper::identity::StaticIdentity;
    use questkeeper::services::QuestSession;
    use std::sync::Arc;

    let h = Harness::new("2024-01-12", "2024-01-10").await;
    h.seed_tasks(&[true]).await;
    let counting = Arc::new(CountingCache::default());
    let mut deps = h.deps();
    deps.cache = counting.clone();
    let marker = cache::last_check_key(h.quest.id);

    let mut first = QuestSession::new(deps.clone(), &StaticIdentity(Some(h.user_id)), h.quest.id)
        .unwrap();
    let report = first.open().await.unwrap();
    assert!(matches!(report.rollover, RolloverStatus::Missed { .. }));
    assert_eq!(counting.reads_of(&marker), 1);

    let mut second = QuestSession::new(deps, &StaticIdentity(Some(h.user_id)), h.quest.id)
        .unwrap();
    let report = second.open().await.unwrap();
    assert_eq!(report.rollover, RolloverStatus::AlreadyChecked);
    assert_eq!(counting.reads_of(&marker), 2);
    assert_eq!(h.store.calls(StoreOp::UpdateQuest).await, 1);
}
