//! Nutrient aggregation
//!
//! Sums dated entries for a single calendar date.

use serde::Serialize;

use crate::models::{DayLog, FoodLogEntry, Nutrition, WaterEntry};

/// Sum every nutrient over the entries dated `date`.
///
/// Omitted optional nutrients count as zero. Order of `entries` does not matter.
pub fn aggregate(entries: &[FoodLogEntry], date: &str) -> Nutrition {
    entries
        .iter()
        .filter(|e| e.date == date)
        .map(FoodLogEntry::nutrition)
        .sum()
}

/// Total milliliters over the water entries dated `date`
pub fn aggregate_water(entries: &[WaterEntry], date: &str) -> i64 {
    entries
        .iter()
        .filter(|e| e.date == date)
        .fold(0i64, |total, e| total.saturating_add(e.amount_ml))
}

/// Running totals for one day log
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTotals {
    pub nutrition: Nutrition,
    pub water_ml: i64,
    pub entry_count: usize,
}

impl DayTotals {
    pub fn from_log(log: &DayLog) -> Self {
        Self {
            nutrition: aggregate(&log.items, &log.date),
            water_ml: log.water_intake_ml,
            entry_count: log.items.iter().filter(|e| e.date == log.date).count(),
        }
    }
}
