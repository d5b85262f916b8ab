// Central constants for rewards, cache keys and configuration.
pub const XP_PER_SUBMISSION: i32 = 50; // same gain for the quest track and the account track
pub const TASKS_CACHE_PREFIX: &str = "tasks-";
pub const LAST_CHECK_CACHE_PREFIX: &str = "last_check_date-";
pub const DEFAULT_CACHE_DIR: &str = ".questkeeper-cache";
pub const COUNTDOWN_TICK_MILLIS: u64 = 1_000;

// Environment variables read by `AppConfig::from_env`.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_USER_ID: &str = "QUESTKEEPER_USER_ID";
pub const ENV_CACHE_DIR: &str = "QUESTKEEPER_CACHE_DIR";
pub const ENV_XP_GAIN: &str = "QUESTKEEPER_XP_GAIN";
pub const ENV_ROLLOVER_XP: &str = "QUESTKEEPER_ROLLOVER_XP";
