//! Runtime configuration.

use crate::constants::{
    DEFAULT_CACHE_DIR, ENV_CACHE_DIR, ENV_DATABASE_URL, ENV_ROLLOVER_XP, ENV_USER_ID,
    ENV_XP_GAIN, XP_PER_SUBMISSION,
};
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use uuid::Uuid;

/// The knobs the engine itself reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// XP deposited into both mastery tracks per completion event.
    pub xp_gain: i32,
    /// Whether the passive rollover check also deposits `xp_gain`.
    pub rollover_awards_xp: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xp_gain: XP_PER_SUBMISSION,
            rollover_awards_xp: true,
        }
    }
}

/// Full configuration for the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub user_id: Option<Uuid>,
    pub cache_dir: PathBuf,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(target = "config", error = %e, "no .env file loaded");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let database_url = lookup(ENV_DATABASE_URL).ok_or(ConfigError::Missing(ENV_DATABASE_URL))?;

        let user_id = lookup(ENV_USER_ID)
            .map(|raw| {
                Uuid::parse_str(raw.trim()).map_err(|_| ConfigError::Invalid {
                    name: ENV_USER_ID,
                    value: raw,
                })
            })
            .transpose()?;

        let cache_dir = lookup(ENV_CACHE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        let mut engine = EngineConfig::default();
        if let Some(raw) = lookup(ENV_XP_GAIN) {
            engine.xp_gain = raw
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|gain| *gain >= 0)
                .ok_or(ConfigError::Invalid {
                    name: ENV_XP_GAIN,
                    value: raw,
                })?;
        }
        if let Some(raw) = lookup(ENV_ROLLOVER_XP) {
            let normalized = raw.trim().to_ascii_lowercase();
            engine.rollover_awards_xp = match normalized.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ENV_ROLLOVER_XP,
                        value: raw,
                    });
                }
            };
        }

        Ok(Self {
            database_url,
            user_id,
            cache_dir,
            engine,
        })
    }
}
