//! Services that sit between the pure mastery rules and the collaborators
//! (remote store, local cache, clock).

pub mod authoring;
pub mod cache;
pub mod countdown;
pub mod reconcile;
pub mod session;

pub use session::{QuestSession, SessionDeps, SessionPhase, SessionView};
