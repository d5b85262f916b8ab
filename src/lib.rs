// Library entry so integration tests and the binary share the same modules.
pub mod clock;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod identity;
pub mod mastery;
pub mod model;
pub mod services;

pub use error::EngineError;
pub use model::AppState;
