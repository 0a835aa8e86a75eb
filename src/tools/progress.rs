//! Progress tool

use chrono::TimeZone;

use crate::db::Database;
use crate::nutrition::{progress_report, ProgressReport};
use super::session::{local_date, parse_date, Session};

/// Compare a day's totals with the user's targets
pub fn get_progress<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    date: Option<&str>,
    now_ms: i64,
    tz: &Tz,
) -> Result<ProgressReport, String> {
    let date = match date {
        Some(d) => parse_date(d)?,
        None => local_date(now_ms, tz)?,
    };
    let profile = session.profile(db)?;
    let log = session.day_log(db, &date)?;
    Ok(progress_report(&log, &profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::config::SessionContext;
    use crate::tools::logging::{add_water, log_food, FoodInput};

    #[test]
    fn test_progress_follows_log() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("progress.db")).unwrap();
        let mut session = Session::new(SessionContext::guest());
        let noon = Utc.with_ymd_and_hms(2025, 1, 9, 12, 0, 0).unwrap().timestamp_millis();

        let input = FoodInput {
            name: "Burrito".to_string(),
            calories: 900.0,
            protein: 40.0,
            carbs: 100.0,
            fat: 35.0,
            fiber: Some(12.0),
            sugar: Some(6.0),
            sodium: Some(2400.0),
            cholesterol: Some(90.0),
            image_url: None,
            confidence: None,
        };
        log_food(&db, &mut session, input, noon, &Utc).unwrap();
        add_water(&db, &mut session, 500, noon, &Utc).unwrap();

        let report = get_progress(&db, &mut session, None, noon, &Utc).unwrap();
        assert_eq!(report.date, "2025-01-09");
        assert_eq!(report.calories_remaining, 1100);
        assert!(report.has_violations);
        assert_eq!(report.water.status_label, "2000ml left");

        let other_day = get_progress(&db, &mut session, Some("2025-01-08"), noon, &Utc).unwrap();
        assert!(!other_day.has_violations);
        assert_eq!(other_day.totals.entry_count, 0);
    }
}
