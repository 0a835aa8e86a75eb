//! Food and water logging tools
//!
//! Each write runs the same pipeline: change the cached day log, hand the new
//! record to storage, then re-check achievements against the updated day.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Database;
use crate::models::{DayLog, FoodLogEntry, MealType, WaterEntry};
use crate::nutrition::DayTotals;
use super::awards::{run_unlock_pass, UnlockOutcome};
use super::persist::{persist_food_entry, persist_water};
use super::session::{local_date, parse_date, Session};

/// A confirmed food item as submitted from the review screen
#[derive(Debug, Clone, Deserialize)]
pub struct FoodInput {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub image_url: Option<String>,
    pub confidence: Option<i64>,
}

impl FoodInput {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Food name must not be empty".to_string());
        }
        let required = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ];
        let optional = [
            ("fiber", self.fiber),
            ("sugar", self.sugar),
            ("sodium", self.sodium),
            ("cholesterol", self.cholesterol),
        ];
        let all = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(n, v)| v.map(|v| (n, v))));
        for (field, value) in all {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", field, value));
            }
        }
        if let Some(c) = self.confidence {
            if !(0..=100).contains(&c) {
                return Err(format!("confidence must be between 0 and 100, got {}", c));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub entry: FoodLogEntry,
    pub totals: DayTotals,
    #[serde(flatten)]
    pub unlocks: UnlockOutcome,
}

#[derive(Debug, Serialize)]
pub struct AddWaterResponse {
    pub date: String,
    pub added_ml: i64,
    pub water_intake_ml: i64,
    pub totals: DayTotals,
    #[serde(flatten)]
    pub unlocks: UnlockOutcome,
}

/// Entries grouped by meal slot
#[derive(Debug, Serialize)]
pub struct DayMeals {
    pub breakfast: Vec<FoodLogEntry>,
    pub lunch: Vec<FoodLogEntry>,
    pub dinner: Vec<FoodLogEntry>,
    pub snack: Vec<FoodLogEntry>,
}

#[derive(Debug, Serialize)]
pub struct DayLogResponse {
    pub date: String,
    pub meals: DayMeals,
    pub water_intake_ml: i64,
    pub totals: DayTotals,
}

#[derive(Debug, Serialize)]
pub struct DeleteFoodEntryResponse {
    pub id: i64,
    pub deleted: bool,
    pub totals: DayTotals,
}

/// Log a food item captured at `timestamp_ms`
pub fn log_food<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    input: FoodInput,
    timestamp_ms: i64,
    tz: &Tz,
) -> Result<LogFoodResponse, String> {
    input.validate()?;

    let date = local_date(timestamp_ms, tz)?;
    let mut entry = FoodLogEntry {
        id: None,
        date: date.clone(),
        name: input.name.trim().to_string(),
        calories: input.calories,
        protein: input.protein,
        carbs: input.carbs,
        fat: input.fat,
        fiber: input.fiber,
        sugar: input.sugar,
        sodium: input.sodium,
        cholesterol: input.cholesterol,
        timestamp: timestamp_ms,
        meal_type: MealType::at(timestamp_ms, tz),
        image_url: input.image_url,
        confidence: input.confidence,
    };

    let mut log = session
        .day_log(db, &date)?
        .add_food_entry(entry.clone())
        .map_err(|e| e.to_string())?;

    let id = if session.ctx.guest {
        Some(session.next_local_id())
    } else {
        persist_food_entry(db, &session.ctx, &entry)
    };

    if let Some(id) = id {
        log.assign_entry_id(timestamp_ms, id);
        entry.id = Some(id);
    }
    session.set_day_log(log.clone());

    info!(
        name = %entry.name,
        meal = entry.meal_type.as_str(),
        calories = entry.calories,
        "Logged food"
    );

    let unlocks = run_unlock_pass(db, session, &log, tz)?;

    Ok(LogFoodResponse {
        entry,
        totals: DayTotals::from_log(&log),
        unlocks,
    })
}

/// Add a water increment. Non-positive amounts change nothing and store nothing.
pub fn add_water<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    amount_ml: i64,
    timestamp_ms: i64,
    tz: &Tz,
) -> Result<AddWaterResponse, String> {
    let date = local_date(timestamp_ms, tz)?;
    let before = session.day_log(db, &date)?;

    if amount_ml <= 0 {
        return Ok(AddWaterResponse {
            water_intake_ml: before.water_intake_ml,
            totals: DayTotals::from_log(&before),
            date,
            added_ml: 0,
            unlocks: UnlockOutcome::default(),
        });
    }

    let log = before.add_water(amount_ml).map_err(|e| e.to_string())?;
    session.set_day_log(log.clone());

    let entry = WaterEntry {
        id: None,
        date: date.clone(),
        amount_ml,
        timestamp: timestamp_ms,
    };
    persist_water(db, &session.ctx, &entry);

    let unlocks = run_unlock_pass(db, session, &log, tz)?;

    Ok(AddWaterResponse {
        date,
        added_ml: amount_ml,
        water_intake_ml: log.water_intake_ml,
        totals: DayTotals::from_log(&log),
        unlocks,
    })
}

/// The log for `date`, or for the day containing `now_ms` when no date is given
pub fn get_day_log<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    date: Option<&str>,
    now_ms: i64,
    tz: &Tz,
) -> Result<DayLogResponse, String> {
    let date = match date {
        Some(d) => parse_date(d)?,
        None => local_date(now_ms, tz)?,
    };
    let log = session.day_log(db, &date)?;
    Ok(day_log_response(&log))
}

pub fn day_log_response(log: &DayLog) -> DayLogResponse {
    let slot = |meal_type| log.meal(meal_type).cloned().collect::<Vec<_>>();
    DayLogResponse {
        date: log.date.clone(),
        meals: DayMeals {
            breakfast: slot(MealType::Breakfast),
            lunch: slot(MealType::Lunch),
            dinner: slot(MealType::Dinner),
            snack: slot(MealType::Snack),
        },
        water_intake_ml: log.water_intake_ml,
        totals: DayTotals::from_log(log),
    }
}

/// Remove a logged entry from the current day. Unlocks already earned are kept.
pub fn delete_food_entry<Tz: TimeZone>(
    db: &Database,
    session: &mut Session,
    id: i64,
    now_ms: i64,
    tz: &Tz,
) -> Result<DeleteFoodEntryResponse, String> {
    let date = local_date(now_ms, tz)?;
    let log = session.day_log(db, &date)?;
    let in_view = log.items.iter().any(|e| e.id == Some(id));

    let deleted = if session.ctx.guest {
        in_view
    } else {
        db.with_conn(|conn| FoodLogEntry::delete(conn, &session.ctx.user_id, id))
            .map_err(|e| format!("Failed to delete food entry: {}", e))?
    };

    let log = log.remove_entry(id);
    session.set_day_log(log.clone());

    Ok(DeleteFoodEntryResponse {
        id,
        deleted,
        totals: DayTotals::from_log(&log),
    })
}
