//! Build information and the startup banner
//!
//! The build number and timestamp are stamped in by `build.rs`.

use serde::Serialize;

use crate::config::Config;

/// Build number, incremented on each recompilation
pub const BUILD_NUMBER: u64 = match option_env!("SNAPCAL_BUILD_NUMBER") {
    Some(s) => match parse_u64(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("SNAPCAL_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

const fn parse_u64(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < b'0' || b > b'9' {
            return None;
        }
        result = result * 10 + (b - b'0') as u64;
        i += 1;
    }
    Some(result)
}

/// Build information for the status tool
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            description: DESCRIPTION,
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Banner lines describing this build and the session it will serve
pub fn banner_lines(config: &Config) -> Vec<String> {
    let info = BuildInfo::current();
    let session = if config.session.guest {
        "guest (nothing is saved)".to_string()
    } else {
        format!("user '{}'", config.session.user_id)
    };
    let vision = match config.vision.api_key {
        Some(_) => format!("{} ({}s timeout)", config.vision.model, config.vision.timeout.as_secs()),
        None => "disabled, GEMINI_API_KEY not set".to_string(),
    };

    vec![
        "===============================================".to_string(),
        "  SnapCal nutrition tracker".to_string(),
        format!("  Version: {} | Build: {}", info.version, info.build_number),
        format!("  Compiled: {}", info.build_timestamp),
        format!("  Session: {}", session),
        format!("  Database: {}", config.database_path.display()),
        format!("  Photo analysis: {}", vision),
        "===============================================".to_string(),
    ]
}

/// Print the startup banner to stderr
pub fn print_startup_banner(config: &Config) {
    for line in banner_lines(config) {
        eprintln!("{}", line);
    }
}
