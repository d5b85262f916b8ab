//! Streak rules: when a quest's period has elapsed, whether the streak was kept,
//! and where the next due date lands.

use chrono::{Days, NaiveDate};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const CUSTOM_PREFIX: &str = "Custom-";

/// How often a quest recurs. Stored as a text tag (`Daily`, `Weekly`, `Custom-N`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom(u32),
    /// Any tag we do not understand. Due dates never move for these.
    Other(String),
}

impl Frequency {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "Daily" => Frequency::Daily,
            "Weekly" => Frequency::Weekly,
            other => match other.strip_prefix(CUSTOM_PREFIX).and_then(leading_days) {
                Some(days) if days > 0 => Frequency::Custom(days),
                _ => Frequency::Other(other.to_string()),
            },
        }
    }

    /// Length of one period in days, if the tag is recognised.
    pub fn period_days(&self) -> Option<u64> {
        match self {
            Frequency::Daily => Some(1),
            Frequency::Weekly => Some(7),
            Frequency::Custom(days) => Some(u64::from(*days)),
            Frequency::Other(_) => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => f.write_str("Daily"),
            Frequency::Weekly => f.write_str("Weekly"),
            Frequency::Custom(days) => write!(f, "{CUSTOM_PREFIX}{days}"),
            Frequency::Other(tag) => f.write_str(tag),
        }
    }
}

impl FromStr for Frequency {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Frequency::parse(s))
    }
}

/// Reads the digit run at the start of a `Custom-` suffix, so `Custom-3days`
/// is a three-day period. Anything after the digits is ignored.
fn leading_days(suffix: &str) -> Option<u32> {
    let suffix = suffix.trim_start();
    let end = suffix
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(suffix.len());
    suffix[..end].parse().ok()
}

/// Advances `date` by one period of `frequency`. Unknown tags leave it unchanged.
pub fn next_due_date(date: NaiveDate, frequency: &Frequency) -> NaiveDate {
    frequency
        .period_days()
        .and_then(|days| date.checked_add_days(Days::new(days)))
        .unwrap_or(date)
}

/// The temporal fields of a quest, at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakState {
    pub streak: i32,
    pub failed_at: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub last_completed_at: Option<NaiveDate>,
}

impl StreakState {
    /// The due date, falling back to `today` when none was ever set.
    pub fn due_or(&self, today: NaiveDate) -> NaiveDate {
        self.due_date.unwrap_or(today)
    }
}

/// Result of the once-a-day passive check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// The period has not elapsed yet.
    NotDue,
    /// The quest was completed on its due day; streak continues.
    Kept {
        streak: i32,
        failed_at: Option<NaiveDate>,
        due_date: NaiveDate,
    },
    /// The period was missed; streak resets.
    Missed {
        failed_at: NaiveDate,
        due_date: NaiveDate,
    },
}

pub fn evaluate_rollover(
    state: &StreakState,
    frequency: &Frequency,
    today: NaiveDate,
) -> RolloverOutcome {
    let due = state.due_or(today);
    if today <= due {
        return RolloverOutcome::NotDue;
    }

    let due_date = next_due_date(today, frequency);
    if state.last_completed_at == Some(due) {
        RolloverOutcome::Kept {
            streak: state.streak.max(0) + 1,
            failed_at: state.failed_at,
            due_date,
        }
    } else {
        RolloverOutcome::Missed {
            failed_at: today,
            due_date,
        }
    }
}

/// Streak fields after an explicit submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub missed: bool,
    pub streak: i32,
    pub failed_at: Option<NaiveDate>,
    pub last_completed_at: NaiveDate,
    pub due_date: NaiveDate,
}

pub fn evaluate_submission(
    state: &StreakState,
    frequency: &Frequency,
    today: NaiveDate,
) -> SubmissionOutcome {
    let due = state.due_or(today);
    let missed = match state.last_completed_at {
        Some(last) => today > due && last != due,
        None => false,
    };

    SubmissionOutcome {
        missed,
        streak: if missed { 0 } else { state.streak.max(0) + 1 },
        failed_at: missed.then_some(today),
        last_completed_at: today,
        due_date: next_due_date(today, frequency),
    }
}
