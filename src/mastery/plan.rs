//! Turns a quest plus "today" into the row update a rollover or submission writes.

use super::leveling::{LevelUpResult, apply_xp_gain};
use super::streak::{RolloverOutcome, evaluate_rollover, evaluate_submission};
use crate::config::EngineConfig;
use crate::database::models::{Quest, QuestProgressUpdate};
use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RolloverPlan {
    pub outcome: RolloverOutcome,
    pub update: QuestProgressUpdate,
    pub leveling: Option<LevelUpResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPlan {
    pub missed: bool,
    pub update: QuestProgressUpdate,
    pub leveling: LevelUpResult,
}

/// Plans the passive daily check. `None` when the due date has not passed.
pub fn plan_rollover(quest: &Quest, today: NaiveDate, config: &EngineConfig) -> Option<RolloverPlan> {
    let state = quest.streak_state();
    let outcome = evaluate_rollover(&state, &quest.frequency, today);

    let (streak, failed_at, due_date) = match outcome {
        RolloverOutcome::NotDue => return None,
        RolloverOutcome::Kept {
            streak,
            failed_at,
            due_date,
        } => (streak, failed_at, due_date),
        RolloverOutcome::Missed {
            failed_at,
            due_date,
        } => (0, Some(failed_at), due_date),
    };

    let leveling = if config.rollover_awards_xp {
        if matches!(outcome, RolloverOutcome::Missed { .. }) {
            warn!(
                target = "quest.rollover",
                quest_id = %quest.id,
                xp = config.xp_gain,
                "awarding rollover xp for a missed period"
            );
        }
        Some(apply_xp_gain(quest.mastery, config.xp_gain))
    } else {
        None
    };

    Some(RolloverPlan {
        outcome,
        update: QuestProgressUpdate {
            streak,
            failed_at,
            last_completed_at: quest.last_completed_at,
            due_date,
            mastery: leveling.map(|l| l.mastery).unwrap_or(quest.mastery),
        },
        leveling,
    })
}

/// Plans an explicit submission. Callers check the checklist gate first.
pub fn plan_submission(quest: &Quest, today: NaiveDate, xp_gain: i32) -> SubmissionPlan {
    let outcome = evaluate_submission(&quest.streak_state(), &quest.frequency, today);
    let leveling = apply_xp_gain(quest.mastery, xp_gain);

    SubmissionPlan {
        missed: outcome.missed,
        update: QuestProgressUpdate {
            streak: outcome.streak,
            failed_at: outcome.failed_at,
            last_completed_at: Some(outcome.last_completed_at),
            due_date: outcome.due_date,
            mastery: leveling.mastery,
        },
        leveling,
    }
}
