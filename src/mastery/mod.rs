//! This module contains the progress and mastery rules for quests.
//! Everything here is pure: no store, cache or clock access.

pub mod leveling;
pub mod plan;
pub mod progress;
pub mod streak;

pub use leveling::{Mastery, apply_xp_gain, threshold_for};
pub use progress::{all_complete, progress_of};
pub use streak::{Frequency, next_due_date};
