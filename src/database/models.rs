//! Contains all the data structures that map to database tables or query results.

use crate::mastery::leveling::Mastery;
use crate::mastery::streak::{Frequency, StreakState};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type QuestId = Uuid;
pub type TaskId = Uuid;
pub type UserId = Uuid;

/// A recurring goal with its own streak and mastery track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quest {
    pub id: QuestId,
    pub user_id: UserId,
    pub name: String,
    pub frequency: Frequency,
    pub streak: i32,
    pub failed_at: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub last_completed_at: Option<NaiveDate>,
    pub mastery: Mastery,
}

impl Quest {
    pub fn streak_state(&self) -> StreakState {
        StreakState {
            streak: self.streak,
            failed_at: self.failed_at,
            due_date: self.due_date,
            last_completed_at: self.last_completed_at,
        }
    }

    /// Mirrors a persisted progress update into this in-memory copy.
    pub fn apply(&mut self, update: &QuestProgressUpdate) {
        self.streak = update.streak;
        self.failed_at = update.failed_at;
        self.last_completed_at = update.last_completed_at;
        self.due_date = Some(update.due_date);
        self.mastery = update.mastery;
    }

    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.last_completed_at == Some(day)
    }
}

/// Raw `quests` row. Nullable counters fall back to a fresh track.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct QuestRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub frequency: String,
    pub streak: Option<i32>,
    pub failed_at: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub last_completed_at: Option<NaiveDate>,
    pub mastery_lvl: Option<i32>,
    pub mastery_xp: Option<i32>,
}

impl From<QuestRow> for Quest {
    fn from(row: QuestRow) -> Self {
        let defaults = Mastery::default();
        Quest {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            frequency: Frequency::parse(&row.frequency),
            streak: row.streak.unwrap_or(0).max(0),
            failed_at: row.failed_at,
            due_date: row.due_date,
            last_completed_at: row.last_completed_at,
            mastery: Mastery::new(
                row.mastery_lvl.unwrap_or(defaults.level).max(defaults.level),
                row.mastery_xp.unwrap_or(defaults.xp).max(0),
            ),
        }
    }
}

/// A checklist item. Also the element type of the cached task snapshot.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub quest_id: QuestId,
    pub user_id: UserId,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Raw `profiles` mastery columns.
#[derive(sqlx::FromRow, Debug, Clone, Copy)]
pub struct ProfileMasteryRow {
    pub xp: Option<i32>,
    pub level: Option<i32>,
}

impl From<ProfileMasteryRow> for Mastery {
    fn from(row: ProfileMasteryRow) -> Self {
        Mastery::new(row.level.unwrap_or(1).max(1), row.xp.unwrap_or(0).max(0))
    }
}

/// The fields a rollover check or submission writes back to a quest row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestProgressUpdate {
    pub streak: i32,
    pub failed_at: Option<NaiveDate>,
    pub last_completed_at: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub mastery: Mastery,
}

/// A validated quest ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuest {
    pub name: String,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
}
