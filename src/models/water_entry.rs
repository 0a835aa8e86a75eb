//! Water entry model
//!
//! Additive water increments; never edited.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A single water increment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterEntry {
    pub id: Option<i64>,
    pub date: String,
    pub amount_ml: i64,
    pub timestamp: i64,
}

impl WaterEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            amount_ml: row.get("amount")?,
            timestamp: row.get("timestamp")?,
        })
    }

    /// Store an increment for a user, returning the new row ID
    pub fn insert(conn: &Connection, user_id: &str, entry: &WaterEntry) -> DbResult<i64> {
        conn.execute(
            "INSERT INTO water_logs (user_id, date, amount, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, entry.date, entry.amount_ml, entry.timestamp],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Increments for one user and date, oldest first
    pub fn list_for_day(conn: &Connection, user_id: &str, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM water_logs WHERE user_id = ?1 AND date = ?2 ORDER BY timestamp, id",
        )?;
        let entries = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
