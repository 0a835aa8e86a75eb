//! Achievement evaluation
//!
//! A fixed, ordered list of achievements, each a predicate over one day's log
//! and the user's profile. Unlocks are monotonic: an achievement that is
//! already unlocked is never evaluated or returned again.

use std::collections::HashSet;

use chrono::TimeZone;
use serde::Serialize;

use crate::models::{local_hour, DayLog, FoodLogEntry, MealType, Profile};
use super::aggregate::DayTotals;

/// Daily water goal in milliliters
pub const WATER_GOAL_ML: i64 = 2500;

/// Everything a predicate may look at
pub struct EvalContext<'a> {
    pub log: &'a DayLog,
    pub profile: &'a Profile,
    pub totals: DayTotals,
    /// Local hour of each entry in `log.items`, same order
    pub hours: Vec<Option<u32>>,
}

impl<'a> EvalContext<'a> {
    pub fn new<Tz: TimeZone>(log: &'a DayLog, profile: &'a Profile, tz: &Tz) -> Self {
        Self {
            log,
            profile,
            totals: DayTotals::from_log(log),
            hours: log.items.iter().map(|e| local_hour(e.timestamp, tz)).collect(),
        }
    }

    /// Entries dated for the log's day, paired with their local hour
    fn day_entries(&self) -> impl Iterator<Item = (&FoodLogEntry, Option<u32>)> + '_ {
        self.log
            .items
            .iter()
            .zip(self.hours.iter().copied())
            .filter(move |(e, _)| e.date == self.log.date)
    }

    /// True if any entry of `meal_type` was captured at a local hour matching `hour_ok`
    fn any_meal_at(&self, meal_type: MealType, hour_ok: impl Fn(u32) -> bool) -> bool {
        self.day_entries()
            .any(|(e, h)| e.meal_type == meal_type && h.is_some_and(&hour_ok))
    }
}

/// An achievement definition
#[derive(Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    pub predicate: fn(&EvalContext<'_>) -> bool,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement").field("id", &self.id).finish()
    }
}

fn early_bird(ctx: &EvalContext<'_>) -> bool {
    ctx.any_meal_at(MealType::Breakfast, |h| h < 9)
}

fn hydration_hero(ctx: &EvalContext<'_>) -> bool {
    ctx.totals.water_ml >= WATER_GOAL_ML
}

fn protein_power(ctx: &EvalContext<'_>) -> bool {
    ctx.totals.nutrition.protein >= ctx.profile.targets.protein as f64
}

fn green_giant(ctx: &EvalContext<'_>) -> bool {
    ctx.day_entries().any(|(e, _)| e.fiber.unwrap_or(0.0) > 5.0)
}

fn night_owl(ctx: &EvalContext<'_>) -> bool {
    ctx.any_meal_at(MealType::Snack, |h| h >= 20)
}

fn first_log(ctx: &EvalContext<'_>) -> bool {
    ctx.totals.entry_count >= 1
}

/// All achievements, in evaluation order
pub static ACHIEVEMENTS: [Achievement; 6] = [
    Achievement {
        id: "early-bird",
        title: "Early Bird",
        description: "Log breakfast before 9 AM",
        icon: "🌅",
        predicate: early_bird,
    },
    Achievement {
        id: "hydration-hero",
        title: "Hydration Hero",
        description: "Drink 2500ml of water",
        icon: "💧",
        predicate: hydration_hero,
    },
    Achievement {
        id: "protein-power",
        title: "Protein Power",
        description: "Hit your protein goal",
        icon: "💪",
        predicate: protein_power,
    },
    Achievement {
        id: "green-giant",
        title: "Green Giant",
        description: "Log a food with more than 5g of fiber",
        icon: "🥦",
        predicate: green_giant,
    },
    Achievement {
        id: "night-owl",
        title: "Night Owl",
        description: "Log a snack after 8 PM",
        icon: "🦉",
        predicate: night_owl,
    },
    Achievement {
        id: "first-log",
        title: "First Bite",
        description: "Log your first meal",
        icon: "🍽️",
        predicate: first_log,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievements newly satisfied by this day, in definition order.
///
/// Anything in `already_unlocked` is skipped regardless of its predicate.
pub fn evaluate<Tz: TimeZone>(
    log: &DayLog,
    profile: &Profile,
    already_unlocked: &HashSet<String>,
    tz: &Tz,
) -> Vec<&'static Achievement> {
    let ctx = EvalContext::new(log, profile, tz);
    ACHIEVEMENTS
        .iter()
        .filter(|a| !already_unlocked.contains(a.id))
        .filter(|a| (a.predicate)(&ctx))
        .collect()
}

/// The single achievement surfaced as a celebration for one evaluation
pub fn celebration<'a>(newly_unlocked: &[&'a Achievement]) -> Option<&'a Achievement> {
    newly_unlocked.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const DATE: &str = "2025-01-09";

    fn at(h: u32, m: u32) -> i64 {
        Utc.with_ymd_and_hms(2025, 1, 9, h, m, 0).unwrap().timestamp_millis()
    }

    fn entry(meal_type: MealType, timestamp: i64, protein: f64, fiber: Option<f64>) -> FoodLogEntry {
        FoodLogEntry {
            id: None,
            date: DATE.to_string(),
            name: "item".to_string(),
            calories: 200.0,
            protein,
            carbs: 20.0,
            fat: 5.0,
            fiber,
            sugar: None,
            sodium: None,
            cholesterol: None,
            timestamp,
            meal_type,
            image_url: None,
            confidence: None,
        }
    }

    fn ids(found: &[&Achievement]) -> Vec<&'static str> {
        found.iter().map(|a| a.id).collect()
    }

    fn log_with(entries: Vec<FoodLogEntry>, water: i64) -> DayLog {
        let mut log = DayLog::empty(DATE).add_water(water).unwrap();
        for e in entries {
            log = log.add_food_entry(e).unwrap();
        }
        log
    }

    #[test]
    fn test_early_breakfast_unlocks_in_definition_order() {
        let log = log_with(vec![entry(MealType::Breakfast, at(8, 0), 10.0, None)], 0);
        let found = evaluate(&log, &Profile::new("u"), &HashSet::new(), &Utc);
        assert_eq!(ids(&found), vec!["early-bird", "first-log"]);
        assert!(!ids(&found).contains(&"hydration-hero"));
        assert_eq!(celebration(&found).map(|a| a.id), Some("early-bird"));
    }

    #[test]
    fn test_breakfast_at_nine_is_not_early() {
        let log = log_with(vec![entry(MealType::Breakfast, at(9, 0), 10.0, None)], 0);
        let found = evaluate(&log, &Profile::new("u"), &HashSet::new(), &Utc);
        assert_eq!(ids(&found), vec!["first-log"]);
    }

    #[test]
    fn test_hydration_threshold() {
        let profile = Profile::new("u");
        let found = evaluate(&log_with(vec![], 2499), &profile, &HashSet::new(), &Utc);
        assert!(found.is_empty());
        let found = evaluate(&log_with(vec![], 2500), &profile, &HashSet::new(), &Utc);
        assert_eq!(ids(&found), vec!["hydration-hero"]);
    }

    #[test]
    fn test_protein_goal_uses_profile_target() {
        let mut profile = Profile::new("u");
        profile.targets.protein = 100;
        let log = log_with(
            vec![
                entry(MealType::Lunch, at(12, 0), 60.0, None),
                entry(MealType::Dinner, at(18, 0), 40.0, None),
            ],
            0,
        );
        let found = evaluate(&log, &profile, &HashSet::new(), &Utc);
        assert_eq!(ids(&found), vec!["protein-power", "first-log"]);

        profile.targets.protein = 101;
        let found = evaluate(&log, &profile, &HashSet::new(), &Utc);
        assert_eq!(ids(&found), vec!["first-log"]);
    }

    #[test]
    fn test_fiber_needs_a_single_item_over_five() {
        let profile = Profile::new("u");
        let split = log_with(
            vec![
                entry(MealType::Lunch, at(12, 0), 1.0, Some(5.0)),
                entry(MealType::Lunch, at(12, 30), 1.0, Some(5.0)),
            ],
            0,
        );
        assert!(!ids(&evaluate(&split, &profile, &HashSet::new(), &Utc)).contains(&"green-giant"));

        let single = log_with(vec![entry(MealType::Lunch, at(12, 0), 1.0, Some(5.5))], 0);
        assert!(ids(&evaluate(&single, &profile, &HashSet::new(), &Utc)).contains(&"green-giant"));
    }

    #[test]
    fn test_late_snack() {
        let profile = Profile::new("u");
        let log = log_with(vec![entry(MealType::Snack, at(22, 15), 1.0, None)], 0);
        assert_eq!(ids(&evaluate(&log, &profile, &HashSet::new(), &Utc)), vec!["night-owl", "first-log"]);

        // A snack-slot entry in the small hours is not a late snack
        let log = log_with(vec![entry(MealType::Snack, at(2, 0), 1.0, None)], 0);
        assert_eq!(ids(&evaluate(&log, &profile, &HashSet::new(), &Utc)), vec!["first-log"]);
    }

    #[test]
    fn test_entries_from_other_dates_are_ignored() {
        let mut stray = entry(MealType::Breakfast, at(7, 0), 1.0, Some(9.0));
        stray.date = "2025-01-08".to_string();
        let mut late = entry(MealType::Snack, at(22, 0), 1.0, None);
        late.date = "2025-01-08".to_string();
        let log = DayLog {
            date: DATE.to_string(),
            items: vec![late, stray],
            water_intake_ml: 0,
        };

        assert!(evaluate(&log, &Profile::new("u"), &HashSet::new(), &Utc).is_empty());
    }

    #[test]
    fn test_unlocked_achievements_never_return() {
        let log = log_with(vec![entry(MealType::Breakfast, at(7, 0), 200.0, Some(8.0))], 3000);
        let profile = Profile::new("u");

        let all: HashSet<String> = ACHIEVEMENTS.iter().map(|a| a.id.to_string()).collect();
        assert!(evaluate(&log, &profile, &all, &Utc).is_empty());

        let first = evaluate(&log, &profile, &HashSet::new(), &Utc);
        let unlocked: HashSet<String> = first.iter().map(|a| a.id.to_string()).collect();
        assert!(evaluate(&log, &profile, &unlocked, &Utc).is_empty());

        // Still not returned once the condition no longer holds
        let empty = DayLog::empty(DATE);
        assert!(evaluate(&empty, &profile, &unlocked, &Utc).is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_findable() {
        let ids: HashSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
        assert_eq!(find("night-owl").map(|a| a.title), Some("Night Owl"));
        assert!(find("streak-master").is_none());
    }
}
