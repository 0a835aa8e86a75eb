//! Persistence hand-off
//!
//! Writes that follow an in-memory change. A failed write is logged and
//! swallowed: the cached state stays as the user sees it. Guest sessions
//! skip storage entirely.

use tracing::{debug, warn};

use crate::config::SessionContext;
use crate::db::Database;
use crate::models::{FoodLogEntry, Preferences, Profile, WaterEntry};

/// Store a food entry, returning its row ID on success
pub fn persist_food_entry(db: &Database, ctx: &SessionContext, entry: &FoodLogEntry) -> Option<i64> {
    if ctx.guest {
        debug!(name = %entry.name, "Guest session, food entry kept in memory only");
        return None;
    }
    match db.with_conn(|conn| FoodLogEntry::insert(conn, &ctx.user_id, entry)) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(user = %ctx.user_id, name = %entry.name, error = %e, "Failed to save food entry");
            None
        }
    }
}

pub fn persist_water(db: &Database, ctx: &SessionContext, entry: &WaterEntry) -> Option<i64> {
    if ctx.guest {
        debug!(amount_ml = entry.amount_ml, "Guest session, water kept in memory only");
        return None;
    }
    match db.with_conn(|conn| WaterEntry::insert(conn, &ctx.user_id, entry)) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(user = %ctx.user_id, amount_ml = entry.amount_ml, error = %e, "Failed to save water");
            None
        }
    }
}

/// Returns whether the profile reached storage
pub fn persist_profile(db: &Database, ctx: &SessionContext, profile: &Profile) -> bool {
    if ctx.guest {
        debug!("Guest session, profile kept in memory only");
        return false;
    }
    match db.with_conn(|conn| Profile::upsert(conn, profile)) {
        Ok(_) => true,
        Err(e) => {
            warn!(user = %ctx.user_id, error = %e, "Failed to save profile");
            false
        }
    }
}

/// Store the merged unlock list. Only the preferences blob is written.
pub fn persist_unlocks(db: &Database, ctx: &SessionContext, preferences: &Preferences) -> bool {
    if ctx.guest {
        debug!("Guest session, unlocks kept in memory only");
        return false;
    }
    match db.with_conn(|conn| Profile::update_preferences(conn, &ctx.user_id, preferences)) {
        Ok(true) => true,
        Ok(false) => {
            warn!(user = %ctx.user_id, "No stored profile to record unlocks on");
            false
        }
        Err(e) => {
            warn!(user = %ctx.user_id, error = %e, "Failed to save unlocks");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;

    fn entry() -> FoodLogEntry {
        FoodLogEntry {
            id: None,
            date: "2025-01-09".to_string(),
            name: "Apple".to_string(),
            calories: 95.0,
            protein: 0.5,
            carbs: 25.0,
            fat: 0.3,
            fiber: Some(4.4),
            sugar: None,
            sodium: None,
            cholesterol: None,
            timestamp: 1_736_409_600_000,
            meal_type: MealType::Snack,
            image_url: None,
            confidence: None,
        }
    }

    #[test]
    fn test_failures_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // Tables were never created, so every write fails
        let db = Database::new(dir.path().join("bare.db")).unwrap();
        let ctx = SessionContext::user("u");

        assert_eq!(persist_food_entry(&db, &ctx, &entry()), None);
        assert!(!persist_profile(&db, &ctx, &Profile::new("u")));
        assert!(!persist_unlocks(&db, &ctx, &Preferences::default()));
    }

    #[test]
    fn test_guest_skips_storage() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("guest.db")).unwrap();
        db.with_conn(crate::db::migrations::run_migrations).unwrap();

        let ctx = SessionContext::guest();
        assert_eq!(persist_food_entry(&db, &ctx, &entry()), None);
        let stored = db
            .with_conn(|conn| FoodLogEntry::list_for_day(conn, &ctx.user_id, "2025-01-09"))
            .unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_user_writes_land() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("user.db")).unwrap();
        db.with_conn(crate::db::migrations::run_migrations).unwrap();

        let ctx = SessionContext::user("u");
        assert!(persist_food_entry(&db, &ctx, &entry()).is_some());
        assert!(persist_profile(&db, &ctx, &Profile::new("u")));

        let mut prefs = Preferences::default();
        prefs.record_unlocks(["first-log"]);
        assert!(persist_unlocks(&db, &ctx, &prefs));
        let stored = db.with_conn(|conn| Profile::get(conn, "u")).unwrap().unwrap();
        assert!(stored.preferences.is_unlocked("first-log"));
    }
}
