//! Day log
//!
//! In-memory view of one user's food and water for a calendar date. All
//! mutations return a new log; persisting them is a separate step.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DbResult;
use crate::nutrition::aggregate::aggregate_water;
use super::{FoodLogEntry, MealType, WaterEntry};

/// Errors raised by day log mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("Entry dated {entry} cannot be added to the log for {log}")]
    DateMismatch { log: String, entry: String },
    #[error("Adding {amount_ml}ml would overflow the water total of {total_ml}ml")]
    WaterOverflow { total_ml: i64, amount_ml: i64 },
}

/// Food entries (newest first) and total water for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    pub date: String,
    pub items: Vec<FoodLogEntry>,
    pub water_intake_ml: i64,
}

impl DayLog {
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            items: Vec::new(),
            water_intake_ml: 0,
        }
    }

    /// Prepend a food entry. Its date must match the log's date.
    pub fn add_food_entry(mut self, entry: FoodLogEntry) -> Result<Self, LogError> {
        if entry.date != self.date {
            return Err(LogError::DateMismatch {
                log: self.date,
                entry: entry.date,
            });
        }
        self.items.insert(0, entry);
        Ok(self)
    }

    /// Add a water increment. Zero or negative amounts leave the log unchanged.
    pub fn add_water(mut self, amount_ml: i64) -> Result<Self, LogError> {
        if amount_ml > 0 {
            self.water_intake_ml = self.water_intake_ml.checked_add(amount_ml).ok_or(
                LogError::WaterOverflow {
                    total_ml: self.water_intake_ml,
                    amount_ml,
                },
            )?;
        }
        Ok(self)
    }

    /// Record the storage ID of an entry that was persisted after being added
    pub fn assign_entry_id(&mut self, timestamp: i64, id: i64) {
        if let Some(entry) = self
            .items
            .iter_mut()
            .find(|e| e.id.is_none() && e.timestamp == timestamp)
        {
            entry.id = Some(id);
        }
    }

    /// Drop a stored entry from the view
    pub fn remove_entry(mut self, id: i64) -> Self {
        self.items.retain(|e| e.id != Some(id));
        self
    }

    /// Entries for one meal slot, in log order
    pub fn meal(&self, meal_type: MealType) -> impl Iterator<Item = &FoodLogEntry> + '_ {
        self.items.iter().filter(move |e| e.meal_type == meal_type)
    }

    /// Build the view from storage
    pub fn load(conn: &Connection, user_id: &str, date: &str) -> DbResult<Self> {
        let items = FoodLogEntry::list_for_day(conn, user_id, date)?;
        let water = WaterEntry::list_for_day(conn, user_id, date)?;

        Ok(Self {
            date: date.to_string(),
            items,
            water_intake_ml: aggregate_water(&water, date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, name: &str, timestamp: i64) -> FoodLogEntry {
        FoodLogEntry {
            id: None,
            date: date.to_string(),
            name: name.to_string(),
            calories: 100.0,
            protein: 5.0,
            carbs: 10.0,
            fat: 3.0,
            fiber: None,
            sugar: None,
            sodium: None,
            cholesterol: None,
            timestamp,
            meal_type: MealType::Lunch,
            image_url: None,
            confidence: None,
        }
    }

    #[test]
    fn test_add_food_entry_prepends() {
        let log = DayLog::empty("2025-01-09")
            .add_food_entry(entry("2025-01-09", "first", 1))
            .unwrap()
            .add_food_entry(entry("2025-01-09", "second", 2))
            .unwrap();

        let names: Vec<&str> = log.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn test_add_food_entry_rejects_other_dates() {
        let result = DayLog::empty("2025-01-09").add_food_entry(entry("2025-01-10", "late", 1));
        assert_eq!(
            result,
            Err(LogError::DateMismatch {
                log: "2025-01-09".to_string(),
                entry: "2025-01-10".to_string(),
            })
        );
    }

    #[test]
    fn test_add_water() {
        let log = DayLog::empty("2025-01-09")
            .add_water(250)
            .unwrap()
            .add_water(500)
            .unwrap();
        assert_eq!(log.water_intake_ml, 750);
    }

    #[test]
    fn test_add_water_rejects_overflow() {
        let log = DayLog::empty("2025-01-09").add_water(i64::MAX).unwrap();
        assert_eq!(
            log.clone().add_water(1),
            Err(LogError::WaterOverflow {
                total_ml: i64::MAX,
                amount_ml: 1,
            })
        );
        assert_eq!(log.clone().add_water(0).unwrap(), log);
    }

    #[test]
    fn test_add_water_ignores_non_positive() {
        let log = DayLog::empty("2025-01-09").add_water(250).unwrap();
        assert_eq!(log.clone().add_water(0).unwrap(), log);
        assert_eq!(log.clone().add_water(-100).unwrap(), log);
    }

    #[test]
    fn test_assign_and_remove_entry() {
        let mut log = DayLog::empty("2025-01-09")
            .add_food_entry(entry("2025-01-09", "soup", 42))
            .unwrap();
        log.assign_entry_id(42, 7);
        assert_eq!(log.items[0].id, Some(7));

        let log = log.remove_entry(7);
        assert!(log.items.is_empty());
    }
}
