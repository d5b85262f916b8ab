//! The quest session: owns one quest's in-memory state and sequences loading,
//! task toggling, task creation and submission.
//!
//! All operations take `&mut self`, so a session never runs two of them at
//! once. UIs observe state through [`QuestSession::subscribe`]: the cached
//! snapshot is published first and the authoritative one replaces it when the
//! fetch lands.
use super::authoring;
use super::cache::{self, LocalCache};
use super::countdown::MidnightCountdown;
use super::reconcile::{self, RolloverStatus, WorkingSet};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::database::QuestStore;
use crate::database::StoreError;
use crate::database::models::{Quest, QuestId, Task, TaskId, UserId};
use crate::error::EngineError;
use crate::identity::IdentityProvider;
use crate::mastery::leveling::{LevelUpResult, Mastery, apply_xp_gain};
use crate::mastery::plan::plan_submission;
use crate::mastery::progress::{all_complete, progress_of};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Submitting,
}

/// Everything a quest screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub quest: Option<Quest>,
    pub tasks: Vec<Task>,
    pub progress: f64,
    pub submitted_today: bool,
    pub can_submit: bool,
    /// True while the tasks shown come from the local snapshot only.
    pub from_cache: bool,
}

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn QuestStore>,
    pub cache: Arc<dyn LocalCache>,
    pub clock: Arc<dyn Clock>,
    pub config: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenReport {
    pub cache_hit: bool,
    pub rollover: RolloverStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub missed: bool,
    pub streak: i32,
    pub due_date: NaiveDate,
    pub quest_leveling: LevelUpResult,
    /// `None` when the account step failed; see `account_error`.
    pub account_leveling: Option<LevelUpResult>,
    /// The quest row was written but the profile was not.
    pub account_error: Option<String>,
}

pub struct QuestSession {
    deps: SessionDeps,
    user_id: UserId,
    quest_id: QuestId,
    phase: SessionPhase,
    quest: Option<Quest>,
    tasks: Vec<Task>,
    from_cache: bool,
    submitted_today: bool,
    view_tx: watch::Sender<SessionView>,
    countdown: Option<MidnightCountdown>,
}

impl QuestSession {
    pub fn new(
        deps: SessionDeps,
        identity: &dyn IdentityProvider,
        quest_id: QuestId,
    ) -> Result<Self, EngineError> {
        let user_id = identity.current_user().ok_or(EngineError::NotAuthenticated)?;
        let (view_tx, _) = watch::channel(SessionView {
            phase: SessionPhase::Loading,
            quest: None,
            tasks: Vec::new(),
            progress: 0.0,
            submitted_today: false,
            can_submit: false,
            from_cache: false,
        });
        Ok(Self {
            deps,
            user_id,
            quest_id,
            phase: SessionPhase::Loading,
            quest: None,
            tasks: Vec::new(),
            from_cache: false,
            submitted_today: false,
            view_tx,
            countdown: None,
        })
    }

    pub fn quest_id(&self) -> QuestId {
        self.quest_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn quest(&self) -> Option<&Quest> {
        self.quest.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn progress(&self) -> f64 {
        progress_of(&self.tasks)
    }

    pub fn mastery(&self) -> Option<Mastery> {
        self.quest.as_ref().map(|q| q.mastery)
    }

    pub fn submitted_today(&self) -> bool {
        self.submitted_today
    }

    /// Whether the submit trigger should be enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::Ready
            && self.quest.is_some()
            && !self.submitted_today
            && all_complete(&self.tasks)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            quest: self.quest.clone(),
            tasks: self.tasks.clone(),
            progress: self.progress(),
            submitted_today: self.submitted_today,
            can_submit: self.can_submit(),
            from_cache: self.from_cache,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.publish();
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        match self.phase {
            SessionPhase::Ready => Ok(()),
            other => Err(EngineError::NotReady(other)),
        }
    }

    fn today(&self) -> NaiveDate {
        self.deps.clock.today()
    }

    /// On-enter hook: cached snapshot, daily rollover check, authoritative fetch.
    ///
    /// A failed fetch leaves the cached tasks on display and is returned as a
    /// recoverable error; the session is still usable.
    #[instrument(level = "debug", skip(self), fields(quest_id = %self.quest_id))]
    pub async fn open(&mut self) -> Result<OpenReport, EngineError> {
        if self.phase == SessionPhase::Submitting {
            return Err(EngineError::NotReady(self.phase));
        }
        self.set_phase(SessionPhase::Loading);

        let snapshot = cache::load_snapshot(self.deps.cache.as_ref(), self.quest_id).await;
        let last_check = snapshot.last_check_date;
        let cached = WorkingSet::from_snapshot(snapshot);
        let cache_hit = cached.from_cache;
        if cache_hit {
            self.tasks = cached.tasks;
            self.from_cache = true;
            self.publish();
        }

        let today = self.today();
        let rollover = reconcile::rollover_if_due(
            self.deps.store.as_ref(),
            self.deps.cache.as_ref(),
            self.user_id,
            self.quest_id,
            last_check,
            today,
            &self.deps.config,
        )
        .await;

        let fetched = reconcile::fetch_authoritative(
            self.deps.store.as_ref(),
            self.deps.cache.as_ref(),
            self.user_id,
            self.quest_id,
        )
        .await;

        match fetched {
            Ok(working) => {
                self.submitted_today = working
                    .quest
                    .as_ref()
                    .is_some_and(|q| q.completed_on(today));
                self.quest = working.quest;
                self.tasks = working.tasks;
                self.from_cache = false;
                self.set_phase(SessionPhase::Ready);
                let (cache_hits, cache_misses) = cache::cache_stats();
                debug!(
                    target = "quest.session",
                    quest_id = %self.quest_id,
                    tasks = self.tasks.len(),
                    cache_hits,
                    cache_misses,
                    ?rollover,
                    "quest loaded"
                );
                Ok(OpenReport {
                    cache_hit,
                    rollover,
                })
            }
            Err(e) => {
                warn!(
                    target = "quest.session",
                    quest_id = %self.quest_id,
                    cache_hit,
                    error = %e,
                    "authoritative fetch failed; keeping cached tasks"
                );
                self.set_phase(SessionPhase::Ready);
                Err(e.into())
            }
        }
    }

    /// On-visible hook. Re-runs the open sequence; the marker keeps the
    /// rollover check to once per day.
    pub async fn on_visible(&mut self) -> Result<OpenReport, EngineError> {
        self.open().await
    }

    /// Starts (or restarts) the midnight countdown. Needs a tokio runtime.
    pub fn start_countdown(&mut self) -> watch::Receiver<u64> {
        let countdown = MidnightCountdown::start(Arc::clone(&self.deps.clock));
        let rx = countdown.subscribe();
        self.countdown = Some(countdown);
        rx
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.as_ref().is_some_and(|c| c.is_running())
    }

    pub fn seconds_until_midnight(&self) -> u64 {
        match &self.countdown {
            Some(countdown) => countdown.remaining(),
            None => self.deps.clock.seconds_until_midnight(),
        }
    }

    /// On-leave hook: stops the countdown.
    pub fn close(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.stop();
        }
    }

    /// Flips one task and returns its new state. Streak and XP are untouched.
    #[instrument(level = "debug", skip(self), fields(quest_id = %self.quest_id, task_id = %task_id))]
    pub async fn toggle_task(&mut self, task_id: TaskId) -> Result<bool, EngineError> {
        self.ensure_ready()?;
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(EngineError::TaskNotFound(task_id))?;
        let completed = !self.tasks[index].completed;

        self.deps
            .store
            .set_task_completed(self.user_id, task_id, completed)
            .await?;

        self.tasks[index].completed = completed;
        cache::write_tasks(self.deps.cache.as_ref(), self.quest_id, &self.tasks).await;
        self.publish();
        Ok(completed)
    }

    /// Creates a task under this quest and shows it first.
    #[instrument(level = "debug", skip(self), fields(quest_id = %self.quest_id))]
    pub async fn add_task(&mut self, name: &str) -> Result<Task, EngineError> {
        self.ensure_ready()?;
        let name = authoring::task_name(name)?;
        let task = self
            .deps
            .store
            .insert_task(self.user_id, self.quest_id, &name)
            .await?;
        self.tasks.insert(0, task.clone());
        cache::write_tasks(self.deps.cache.as_ref(), self.quest_id, &self.tasks).await;
        self.publish();
        Ok(task)
    }

    /// Submits today's completion: advances the streak and due date and
    /// deposits XP into the quest track and the account track.
    ///
    /// If the quest row cannot be written nothing changes. If only the profile
    /// step fails, the quest result stands and the failure is reported in
    /// [`SubmissionReport::account_error`].
    #[instrument(level = "debug", skip(self), fields(quest_id = %self.quest_id))]
    pub async fn submit_quest(&mut self) -> Result<SubmissionReport, EngineError> {
        self.ensure_ready()?;
        let quest = self
            .quest
            .as_ref()
            .ok_or(EngineError::Precondition("quest details have not loaded"))?;
        if self.submitted_today {
            return Err(EngineError::Precondition("quest already submitted today"));
        }
        if !all_complete(&self.tasks) {
            return Err(EngineError::Precondition("all tasks must be complete"));
        }

        let today = self.today();
        let plan = plan_submission(quest, today, self.deps.config.xp_gain);

        self.set_phase(SessionPhase::Submitting);
        if let Err(e) = self
            .deps
            .store
            .update_quest_progress(self.user_id, self.quest_id, &plan.update)
            .await
        {
            warn!(target = "quest.submit", quest_id = %self.quest_id, error = %e, "quest update failed");
            self.set_phase(SessionPhase::Ready);
            return Err(e.into());
        }

        if let Some(quest) = self.quest.as_mut() {
            quest.apply(&plan.update);
        }
        self.submitted_today = true;

        let (account_leveling, account_error) = match self.award_account_xp().await {
            Ok(result) => (Some(result), None),
            Err(e) => {
                warn!(
                    target = "quest.submit",
                    quest_id = %self.quest_id,
                    error = %e,
                    "quest saved but account xp was not"
                );
                (None, Some(e.to_string()))
            }
        };

        self.set_phase(SessionPhase::Ready);
        info!(
            target = "quest.submit",
            quest_id = %self.quest_id,
            streak = plan.update.streak,
            missed = plan.missed,
            level = plan.update.mastery.level,
            "quest submitted"
        );

        Ok(SubmissionReport {
            missed: plan.missed,
            streak: plan.update.streak,
            due_date: plan.update.due_date,
            quest_leveling: plan.leveling,
            account_leveling,
            account_error,
        })
    }

    /// Re-derives the account track from its persisted value.
    async fn award_account_xp(&self) -> Result<LevelUpResult, StoreError> {
        let current = self.deps.store.fetch_profile_mastery(self.user_id).await?;
        let result = apply_xp_gain(current, self.deps.config.xp_gain);
        self.deps
            .store
            .update_profile_mastery(self.user_id, result.mastery)
            .await?;
        Ok(result)
    }
}
