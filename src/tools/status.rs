//! SnapCal Status Tool
//!
//! Provides runtime status information about the SnapCal service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::config::SessionContext;

/// Usage notes for AI assistants driving the server
pub const USAGE_INSTRUCTIONS: &str = "SnapCal - photo-based nutrition tracking. \
New users: get_profile, then complete_onboarding (age, sex, height_cm, weight_kg, goal, activity_level), then subscribe. \
Logging: analyze_food_photo returns an estimate to review, then log_food saves it; meal slot and date come from the capture time. \
Water: add_water with a positive amount in ml. \
Day view: get_day_log, delete_food_entry. Progress against targets: get_progress. \
Achievements: list_achievements, check_achievements (log_food and add_water already check). \
Settings: update_profile (targets are recalculated), set_nutrient_limits, set_preferences.";

/// Runtime status of the SnapCal service
#[derive(Debug, Clone, Serialize)]
pub struct SnapCalStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Session information
    pub user_id: String,
    pub guest: bool,
    pub vision_configured: bool,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    vision_configured: bool,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, vision_configured: bool) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            vision_configured,
        }
    }

    pub fn get_status(&self, session: &SessionContext) -> SnapCalStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        SnapCalStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            user_id: session.user_id.clone(),
            guest: session.guest,
            vision_configured: self.vision_configured,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
