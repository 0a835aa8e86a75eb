//! Session state
//!
//! The profile and day log the server is currently working with. Both are
//! loaded lazily from storage (or created fresh for guests) and then kept in
//! memory; tools mutate the cached copies and hand them to `persist`.

use std::collections::HashMap;

use chrono::TimeZone;

use crate::config::SessionContext;
use crate::db::Database;
use crate::models::{DayLog, Profile};

pub struct Session {
    pub ctx: SessionContext,
    profile: Option<Profile>,
    day_log: Option<DayLog>,
    /// Every day a guest has touched; there is no storage to reload them from
    guest_days: HashMap<String, DayLog>,
    /// IDs handed to guest entries, which never reach storage
    next_local_id: i64,
}

impl Session {
    pub fn new(ctx: SessionContext) -> Self {
        Self {
            ctx,
            profile: None,
            day_log: None,
            guest_days: HashMap::new(),
            next_local_id: 1,
        }
    }

    /// The cached profile, loading it on first use.
    ///
    /// A user with no stored row gets the onboarding defaults.
    pub fn profile(&mut self, db: &Database) -> Result<Profile, String> {
        if let Some(profile) = &self.profile {
            return Ok(profile.clone());
        }

        let profile = if self.ctx.guest {
            Profile::new(&self.ctx.user_id)
        } else {
            db.with_conn(|conn| Profile::get(conn, &self.ctx.user_id))
                .map_err(|e| format!("Failed to load profile: {}", e))?
                .unwrap_or_else(|| Profile::new(&self.ctx.user_id))
        };

        self.profile = Some(profile.clone());
        Ok(profile)
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// The log for `date`.
    ///
    /// Users keep one cached day and reload from storage when the date
    /// changes. Guests keep every day they have logged in memory.
    pub fn day_log(&mut self, db: &Database, date: &str) -> Result<DayLog, String> {
        if self.ctx.guest {
            return Ok(self
                .guest_days
                .get(date)
                .cloned()
                .unwrap_or_else(|| DayLog::empty(date)));
        }

        if let Some(log) = self.day_log.as_ref().filter(|l| l.date == date) {
            return Ok(log.clone());
        }

        let log = db
            .with_conn(|conn| DayLog::load(conn, &self.ctx.user_id, date))
            .map_err(|e| format!("Failed to load log for {}: {}", date, e))?;

        self.day_log = Some(log.clone());
        Ok(log)
    }

    pub fn set_day_log(&mut self, log: DayLog) {
        if self.ctx.guest {
            self.guest_days.insert(log.date.clone(), log);
        } else {
            self.day_log = Some(log);
        }
    }

    pub fn next_local_id(&mut self) -> i64 {
        let id = self.next_local_id;
        self.next_local_id += 1;
        id
    }
}

/// Local calendar date ("YYYY-MM-DD") of an epoch-millisecond timestamp
pub fn local_date<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> Result<String, String> {
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .ok_or_else(|| format!("Timestamp {} is out of range", timestamp_ms))
}

/// Validate a caller-supplied date string
pub fn parse_date(date: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}
