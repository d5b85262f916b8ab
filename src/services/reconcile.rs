//! Cache-first loading: show the local snapshot, run the daily rollover check at
//! most once per quest per day, then let the authoritative fetch overwrite both
//! memory and cache.
use super::cache::{self, CachedSnapshot, LocalCache};
use crate::config::EngineConfig;
use crate::database::models::{Quest, QuestId, Task, UserId};
use crate::database::{QuestStore, StoreError};
use crate::mastery::plan::plan_rollover;
use crate::mastery::streak::RolloverOutcome;
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

/// What the once-a-day check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverStatus {
    /// The marker already equals today.
    AlreadyChecked,
    NotDue,
    Kept { streak: i32 },
    Missed { failed_at: NaiveDate },
    /// The check could not complete; the marker was left alone so it runs again.
    Failed(String),
}

/// The working snapshot the session starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    pub quest: Option<Quest>,
    pub tasks: Vec<Task>,
    pub from_cache: bool,
}

impl WorkingSet {
    pub fn from_snapshot(snapshot: CachedSnapshot) -> Self {
        match snapshot.tasks {
            Some(tasks) => Self {
                quest: None,
                tasks,
                from_cache: true,
            },
            None => Self::default(),
        }
    }
}

/// Runs the passive rollover check unless `last_check` says it already ran today.
/// `last_check` is the marker as read with the snapshot; it is not read again here.
#[instrument(level = "debug", skip(store, cache, config), fields(quest_id = %quest_id, %today))]
pub async fn rollover_if_due(
    store: &dyn QuestStore,
    cache: &dyn LocalCache,
    user_id: UserId,
    quest_id: QuestId,
    last_check: Option<NaiveDate>,
    today: NaiveDate,
    config: &EngineConfig,
) -> RolloverStatus {
    if last_check == Some(today) {
        return RolloverStatus::AlreadyChecked;
    }

    match run_rollover(store, user_id, quest_id, today, config).await {
        Ok(status) => {
            cache::mark_checked(cache, quest_id, today).await;
            status
        }
        Err(e) => {
            warn!(target = "quest.rollover", %quest_id, error = %e, "rollover check failed");
            RolloverStatus::Failed(e.to_string())
        }
    }
}

async fn run_rollover(
    store: &dyn QuestStore,
    user_id: UserId,
    quest_id: QuestId,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<RolloverStatus, StoreError> {
    let quest = store.fetch_quest(user_id, quest_id).await?;
    let Some(plan) = plan_rollover(&quest, today, config) else {
        return Ok(RolloverStatus::NotDue);
    };

    store
        .update_quest_progress(user_id, quest_id, &plan.update)
        .await?;

    let status = match plan.outcome {
        RolloverOutcome::Kept { streak, .. } => RolloverStatus::Kept { streak },
        RolloverOutcome::Missed { failed_at, .. } => RolloverStatus::Missed { failed_at },
        RolloverOutcome::NotDue => RolloverStatus::NotDue,
    };
    info!(
        target = "quest.rollover",
        %quest_id,
        ?status,
        due_date = %plan.update.due_date,
        level = plan.update.mastery.level,
        "rollover applied"
    );
    Ok(status)
}

/// Fetches the quest and its tasks. On success the cached task snapshot is
/// replaced unconditionally; on failure the cache is untouched.
#[instrument(level = "debug", skip(store, cache), fields(quest_id = %quest_id))]
pub async fn fetch_authoritative(
    store: &dyn QuestStore,
    cache: &dyn LocalCache,
    user_id: UserId,
    quest_id: QuestId,
) -> Result<WorkingSet, StoreError> {
    let quest = store.fetch_quest(user_id, quest_id).await?;
    let tasks = store.fetch_tasks(user_id, quest_id).await?;
    cache::write_tasks(cache, quest_id, &tasks).await;
    Ok(WorkingSet {
        quest: Some(quest),
        tasks,
        from_cache: false,
    })
}
