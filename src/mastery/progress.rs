//! Completion progress of a quest's checklist.

use crate::database::models::Task;

pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.completed).count()
}

/// Completed fraction in `[0, 1]`; an empty checklist has no progress.
pub fn progress_of(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    completed_count(tasks) as f64 / tasks.len() as f64
}

/// Gate for quest submission: at least one task, all of them done.
pub fn all_complete(tasks: &[Task]) -> bool {
    !tasks.is_empty() && tasks.iter().all(|t| t.completed)
}
