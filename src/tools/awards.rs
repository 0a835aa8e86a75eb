//! Achievement tools
//!
//! Listing the achievement board and running the unlock pass after a log change.

use std::collections::HashSet;

use chrono::TimeZone;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::DayLog;
use crate::nutrition::{celebration, evaluate, Achievement, ACHIEVEMENTS};
use super::persist::persist_unlocks;
use super::session::{local_date, Session};

#[derive(Debug, Clone, Serialize)]
pub struct AchievementView {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
}

impl AchievementView {
    fn new(achievement: &Achievement, unlocked: bool) -> Self {
        Self {
            id: achievement.id,
            title: achievement.title,
            description: achievement.description,
            icon: achievement.icon,
            unlocked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListAchievementsResponse {
    pub achievements: Vec<AchievementView>,
    pub unlocked_count: usize,
    pub total: usize,
}

/// Achievements unlocked by one evaluation
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnlockOutcome {
    pub newly_unlocked: Vec<AchievementView>,
    /// The one unlock to celebrate, first in definition order
    pub celebration: Option<AchievementView>,
}

pub fn list_achievements(db: &Database, session: &mut Session) -> Result<ListAchievementsResponse, String> {
    let profile = session.profile(db)?;
    let achievements: Vec<AchievementView> = ACHIEVEMENTS
        .iter()
        .map(|a| AchievementView::new(a, profile.preferences.is_unlocked(a.id)))
        .collect();
    let unlocked_count = achievements.iter().filter(|a| a.unlocked).count();

    Ok(ListAchievementsResponse {
        total: achievements.len(),
        achievements,
        unlocked_count,
    })
}

/// Evaluate `log` against the cached profile and merge any new unlocks
pub fn run_unlock_pass<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    log: &DayLog,
    tz: &Tz,
) -> Result<UnlockOutcome, String> {
    let mut profile = session.profile(db)?;
    let already: HashSet<String> = profile.preferences.unlocked_awards.iter().cloned().collect();

    let found = evaluate(log, &profile, &already, tz);
    if found.is_empty() {
        return Ok(UnlockOutcome::default());
    }

    let added = profile.preferences.record_unlocks(found.iter().map(|a| a.id));
    info!(user = %session.ctx.user_id, unlocked = ?added, "Achievements unlocked");

    persist_unlocks(db, &session.ctx, &profile.preferences);
    session.set_profile(profile);

    Ok(UnlockOutcome {
        celebration: celebration(&found).map(|a| AchievementView::new(a, true)),
        newly_unlocked: found.into_iter().map(|a| AchievementView::new(a, true)).collect(),
    })
}

/// Re-run the unlock pass for the day containing `now_ms`
pub fn check_achievements<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    now_ms: i64,
    tz: &Tz,
) -> Result<UnlockOutcome, String> {
    let date = local_date(now_ms, tz)?;
    let log = session.day_log(db, &date)?;
    run_unlock_pass(db, session, &log, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::config::SessionContext;
    use crate::models::{FoodLogEntry, MealType};

    fn guest() -> (tempfile::TempDir, Database, Session) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("awards.db")).unwrap();
        (dir, db, Session::new(SessionContext::guest()))
    }

    fn breakfast_at_eight() -> (DayLog, i64) {
        let ts = Utc.with_ymd_and_hms(2025, 1, 9, 8, 0, 0).unwrap().timestamp_millis();
        let entry = FoodLogEntry {
            id: Some(1),
            date: "2025-01-09".to_string(),
            name: "Eggs".to_string(),
            calories: 150.0,
            protein: 12.0,
            carbs: 1.0,
            fat: 10.0,
            fiber: None,
            sugar: None,
            sodium: None,
            cholesterol: None,
            timestamp: ts,
            meal_type: MealType::Breakfast,
            image_url: None,
            confidence: None,
        };
        (DayLog::empty("2025-01-09").add_food_entry(entry).unwrap(), ts)
    }

    #[test]
    fn test_unlock_pass_merges_once() {
        let (_dir, db, mut session) = guest();
        let (log, _) = breakfast_at_eight();

        let outcome = run_unlock_pass(&db, &mut session, &log, &Utc).unwrap();
        let ids: Vec<&str> = outcome.newly_unlocked.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["early-bird", "first-log"]);
        assert_eq!(outcome.celebration.map(|a| a.id), Some("early-bird"));

        let again = run_unlock_pass(&db, &mut session, &log, &Utc).unwrap();
        assert!(again.newly_unlocked.is_empty());
        assert!(again.celebration.is_none());

        let board = list_achievements(&db, &mut session).unwrap();
        assert_eq!(board.total, 6);
        assert_eq!(board.unlocked_count, 2);
    }

    #[test]
    fn test_check_uses_cached_day() {
        let (_dir, db, mut session) = guest();
        let (log, ts) = breakfast_at_eight();
        session.set_day_log(log);

        let outcome = check_achievements(&db, &mut session, ts, &Utc).unwrap();
        assert_eq!(outcome.newly_unlocked.len(), 2);
    }
}
