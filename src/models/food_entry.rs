//! Food log entry model
//!
//! One confirmed food item, with the meal slot fixed at capture time.

use chrono::{TimeZone, Timelike};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::Nutrition;

/// Meal slot, assigned from the capture hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ORDER: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }

    /// Classify a local hour of day (0-23).
    ///
    /// 05:00-10:59 breakfast, 11:00-15:59 lunch, 16:00-21:59 dinner, else snack.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=10 => MealType::Breakfast,
            11..=15 => MealType::Lunch,
            16..=21 => MealType::Dinner,
            _ => MealType::Snack,
        }
    }

    /// Classify an epoch-millisecond capture time in the given time zone
    pub fn at<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> Self {
        local_hour(timestamp_ms, tz).map_or(MealType::Snack, Self::from_hour)
    }
}

/// Hour of day for an epoch-millisecond timestamp in the given time zone
pub fn local_hour<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> Option<u32> {
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.hour())
}

/// A logged food item. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    /// Storage ID, `None` until the entry has been persisted
    pub id: Option<i64>,
    pub date: String, // local date: "2025-01-09"
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    /// Capture time, epoch milliseconds
    pub timestamp: i64,
    pub meal_type: MealType,
    pub image_url: Option<String>,
    pub confidence: Option<i64>,
}

impl FoodLogEntry {
    /// Nutrient values with omitted optional fields counted as zero
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber.unwrap_or(0.0),
            sugar: self.sugar.unwrap_or(0.0),
            sodium: self.sodium.unwrap_or(0.0),
            cholesterol: self.cholesterol.unwrap_or(0.0),
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            name: row.get("name")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fat: row.get("fat")?,
            fiber: row.get("fiber")?,
            sugar: row.get("sugar")?,
            sodium: row.get("sodium")?,
            cholesterol: row.get("cholesterol")?,
            timestamp: row.get("timestamp")?,
            meal_type: MealType::from_str(&meal_type).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    Type::Text,
                    format!("invalid meal_type: {}", meal_type).into(),
                )
            })?,
            image_url: row.get("image_url")?,
            confidence: row.get("confidence")?,
        })
    }

    /// Store an entry for a user, returning the new row ID
    pub fn insert(conn: &Connection, user_id: &str, entry: &FoodLogEntry) -> DbResult<i64> {
        conn.execute(
            r#"
            INSERT INTO food_logs (
                user_id, date, meal_type, name,
                calories, protein, carbs, fat,
                fiber, sugar, sodium, cholesterol,
                confidence, image_url, timestamp
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                user_id,
                entry.date,
                entry.meal_type.as_str(),
                entry.name,
                entry.calories,
                entry.protein,
                entry.carbs,
                entry.fat,
                entry.fiber,
                entry.sugar,
                entry.sodium,
                entry.cholesterol,
                entry.confidence,
                entry.image_url,
                entry.timestamp,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Entries for one user and date, newest first
    pub fn list_for_day(conn: &Connection, user_id: &str, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_logs WHERE user_id = ?1 AND date = ?2 ORDER BY timestamp DESC, id DESC",
        )?;
        let entries = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete one of a user's entries
    pub fn delete(conn: &Connection, user_id: &str, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM food_logs WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_meal_slot_boundaries() {
        assert_eq!(MealType::from_hour(4), MealType::Snack);
        assert_eq!(MealType::from_hour(5), MealType::Breakfast);
        assert_eq!(MealType::from_hour(10), MealType::Breakfast);
        assert_eq!(MealType::from_hour(11), MealType::Lunch);
        assert_eq!(MealType::from_hour(15), MealType::Lunch);
        assert_eq!(MealType::from_hour(16), MealType::Dinner);
        assert_eq!(MealType::from_hour(21), MealType::Dinner);
        assert_eq!(MealType::from_hour(22), MealType::Snack);
        assert_eq!(MealType::from_hour(0), MealType::Snack);
    }

    fn at_utc(h: u32, m: u32) -> i64 {
        Utc.with_ymd_and_hms(2025, 1, 9, h, m, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn test_meal_slot_from_timestamp_minutes() {
        assert_eq!(MealType::at(at_utc(10, 59), &Utc), MealType::Breakfast);
        assert_eq!(MealType::at(at_utc(11, 0), &Utc), MealType::Lunch);
        assert_eq!(MealType::at(at_utc(15, 59), &Utc), MealType::Lunch);
        assert_eq!(MealType::at(at_utc(16, 0), &Utc), MealType::Dinner);
        assert_eq!(MealType::at(at_utc(21, 59), &Utc), MealType::Dinner);
        assert_eq!(MealType::at(at_utc(22, 0), &Utc), MealType::Snack);
        assert_eq!(MealType::at(at_utc(4, 59), &Utc), MealType::Snack);
    }

    #[test]
    fn test_meal_slot_uses_local_hour() {
        // 06:00 UTC is 08:00 at UTC+2
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(local_hour(at_utc(6, 0), &plus_two), Some(8));
        assert_eq!(MealType::at(at_utc(3, 30), &plus_two), MealType::Breakfast);
        assert_eq!(MealType::at(at_utc(3, 30), &Utc), MealType::Snack);
    }

    #[test]
    fn test_missing_optional_nutrients_are_zero() {
        let entry = FoodLogEntry {
            id: None,
            date: "2025-01-09".to_string(),
            name: "Toast".to_string(),
            calories: 120.0,
            protein: 4.0,
            carbs: 20.0,
            fat: 2.0,
            fiber: Some(3.0),
            sugar: None,
            sodium: None,
            cholesterol: None,
            timestamp: 0,
            meal_type: MealType::Breakfast,
            image_url: None,
            confidence: None,
        };
        let n = entry.nutrition();
        assert_eq!(n.fiber, 3.0);
        assert_eq!(n.sugar, 0.0);
        assert_eq!(n.sodium, 0.0);
    }
}
