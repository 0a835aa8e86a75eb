//! Runtime configuration
//!
//! Everything is read from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DATABASE_PATH_ENV: &str = "SNAPCAL_DATABASE_PATH";
pub const USER_ID_ENV: &str = "SNAPCAL_USER_ID";
pub const GUEST_ENV: &str = "SNAPCAL_GUEST";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const VISION_MODEL_ENV: &str = "SNAPCAL_VISION_MODEL";
pub const VISION_TIMEOUT_ENV: &str = "SNAPCAL_VISION_TIMEOUT_SECS";

pub const DEFAULT_USER_ID: &str = "local";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Who the server is acting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
    /// Guest sessions keep everything in memory and never touch storage
    pub guest: bool,
}

impl SessionContext {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            guest: false,
        }
    }

    pub fn guest() -> Self {
        Self {
            user_id: "guest".to_string(),
            guest: true,
        }
    }
}

/// Settings for the photo analysis call
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_VISION_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub session: SessionContext,
    pub vision: VisionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let session = if lookup(GUEST_ENV).as_deref().is_some_and(is_truthy) {
            SessionContext::guest()
        } else {
            let user_id = lookup(USER_ID_ENV).unwrap_or_else(|| DEFAULT_USER_ID.to_string());
            if user_id.trim().is_empty() {
                return Err(ConfigError::Empty(USER_ID_ENV));
            }
            SessionContext::user(user_id.trim())
        };

        let timeout = match lookup(VISION_TIMEOUT_ENV) {
            Some(value) => parse_timeout(&value)?,
            None => Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
        };

        let vision = VisionConfig {
            api_key: lookup(GEMINI_API_KEY_ENV).filter(|k| !k.trim().is_empty()),
            model: lookup(VISION_MODEL_ENV)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            timeout,
        };

        Ok(Self {
            database_path,
            session,
            vision,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            name: VISION_TIMEOUT_ENV,
            value: value.to_string(),
        }),
    }
}

/// `<project>/data/snapcal.db`, found relative to the running binary
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("snapcal.db");
    path
}
