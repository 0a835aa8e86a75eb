//! Profile model
//!
//! Body stats, goal, derived daily targets and the preference bag for one user.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DbError, DbResult};
use crate::nutrition::targets::compute_targets;

/// Errors raised while deriving targets from a profile
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("Invalid body stats: {0}")]
    InvalidBodyStats(String),

    #[error("Body stats produce a non-positive calorie target ({0} kcal)")]
    NonPositiveCalories(i64),
}

/// Biological sex category used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            "other" => Some(Sex::Other),
            _ => None,
        }
    }
}

/// What the user wants their intake to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "Lose Weight")]
    LoseWeight,
    Maintain,
    #[serde(rename = "Gain Muscle")]
    GainMuscle,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::LoseWeight => "Lose Weight",
            Goal::Maintain => "Maintain",
            Goal::GainMuscle => "Gain Muscle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "lose weight" | "lose" | "reduce" => Some(Goal::LoseWeight),
            "maintain" => Some(Goal::Maintain),
            "gain muscle" | "gain" | "increase" => Some(Goal::GainMuscle),
            _ => None,
        }
    }
}

/// Activity level, ordered from sedentary to very active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    #[serde(rename = "Lightly Active")]
    Light,
    #[serde(rename = "Moderately Active")]
    Moderate,
    #[serde(rename = "Very Active")]
    Active,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Lightly Active",
            ActivityLevel::Moderate => "Moderately Active",
            ActivityLevel::Active => "Very Active",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" | "lightly active" => Some(ActivityLevel::Light),
            "moderate" | "moderately active" => Some(ActivityLevel::Moderate),
            "active" | "very active" => Some(ActivityLevel::Active),
            _ => None,
        }
    }
}

/// Daily targets. Stored as the `targets` JSON blob, keys match the hosted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Targets {
    #[serde(rename = "targetCalories")]
    pub calories: i64,
    #[serde(rename = "targetProtein")]
    pub protein: i64,
    #[serde(rename = "targetCarbs")]
    pub carbs: i64,
    #[serde(rename = "targetFat")]
    pub fat: i64,
    #[serde(rename = "targetFiber")]
    pub fiber: i64,
    #[serde(rename = "targetSugar")]
    pub sugar: i64,
    #[serde(rename = "maxSodium")]
    pub sodium: i64,
    #[serde(rename = "maxCholesterol")]
    pub cholesterol: i64,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            calories: 2000,
            protein: 150,
            carbs: 200,
            fat: 65,
            fiber: 30,
            sugar: 50,
            sodium: 2300,
            cholesterol: 300,
        }
    }
}

/// Preference bag. Stored as the `preferences` JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub dark_mode: bool,
    pub notifications: bool,
    pub weekly_reports: bool,
    pub health_sync: bool,
    pub unlocked_awards: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
            weekly_reports: false,
            health_sync: false,
            unlocked_awards: Vec::new(),
        }
    }
}

impl Preferences {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked_awards.iter().any(|a| a == id)
    }

    /// Merge newly unlocked ids. Unlocks are never removed.
    ///
    /// Returns the ids that were not already present.
    pub fn record_unlocks<'a, I>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = Vec::new();
        for id in ids {
            if !self.is_unlocked(id) {
                self.unlocked_awards.push(id.to_string());
                added.push(id.to_string());
            }
        }
        added
    }
}

/// The inputs to the target calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyStats {
    pub age: i64,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
}

/// A user's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    pub targets: Targets,
    pub has_onboarded: bool,
    pub is_premium: bool,
    pub preferences: Preferences,
}

impl Profile {
    /// A fresh profile with the onboarding defaults
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            age: 25,
            sex: Sex::Male,
            height_cm: 175.0,
            weight_kg: 70.0,
            goal: Goal::LoseWeight,
            activity_level: ActivityLevel::Moderate,
            targets: Targets::default(),
            has_onboarded: false,
            is_premium: false,
            preferences: Preferences::default(),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Guest User"
        } else {
            &self.name
        }
    }

    pub fn body_stats(&self) -> BodyStats {
        BodyStats {
            age: self.age,
            sex: self.sex,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            goal: self.goal,
            activity_level: self.activity_level,
        }
    }

    /// Re-derive calorie and macro targets from the current body stats
    pub fn recalculate(mut self) -> Result<Self, ProfileError> {
        self.targets = compute_targets(&self.body_stats(), &self.targets)?;
        Ok(self)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender: String = row.get("gender")?;
        let goal: String = row.get("goal")?;
        let activity: String = row.get("activity_level")?;
        let targets: String = row.get("targets")?;
        let preferences: String = row.get("preferences")?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
            sex: Sex::from_str(&gender).ok_or_else(|| invalid_text("gender", &gender))?,
            height_cm: row.get("height")?,
            weight_kg: row.get("weight")?,
            goal: Goal::from_str(&goal).ok_or_else(|| invalid_text("goal", &goal))?,
            activity_level: ActivityLevel::from_str(&activity)
                .ok_or_else(|| invalid_text("activity_level", &activity))?,
            targets: serde_json::from_str(&targets)
                .map_err(|e| invalid_text("targets", &e.to_string()))?,
            has_onboarded: row.get("has_onboarded")?,
            is_premium: row.get("is_premium")?,
            preferences: serde_json::from_str(&preferences)
                .map_err(|e| invalid_text("preferences", &e.to_string()))?,
        })
    }

    /// Get a profile by user ID
    pub fn get(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or replace the whole profile row
    pub fn upsert(conn: &Connection, profile: &Profile) -> DbResult<Self> {
        let targets = serde_json::to_string(&profile.targets)?;
        let preferences = serde_json::to_string(&profile.preferences)?;

        conn.execute(
            r#"
            INSERT INTO profiles (
                id, name, age, gender, height, weight, goal, activity_level,
                has_onboarded, is_premium, targets, preferences
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                age = excluded.age,
                gender = excluded.gender,
                height = excluded.height,
                weight = excluded.weight,
                goal = excluded.goal,
                activity_level = excluded.activity_level,
                has_onboarded = excluded.has_onboarded,
                is_premium = excluded.is_premium,
                targets = excluded.targets,
                preferences = excluded.preferences,
                updated_at = datetime('now')
            "#,
            params![
                profile.id,
                profile.name,
                profile.age,
                profile.sex.as_str(),
                profile.height_cm,
                profile.weight_kg,
                profile.goal.as_str(),
                profile.activity_level.as_str(),
                profile.has_onboarded,
                profile.is_premium,
                targets,
                preferences,
            ],
        )?;

        Self::get(conn, &profile.id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Replace only the preferences blob
    pub fn update_preferences(conn: &Connection, id: &str, preferences: &Preferences) -> DbResult<bool> {
        let json = serde_json::to_string(preferences)?;
        let rows = conn.execute(
            "UPDATE profiles SET preferences = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![json, id],
        )?;
        Ok(rows > 0)
    }

    /// Replace only the targets blob
    pub fn update_targets(conn: &Connection, id: &str, targets: &Targets) -> DbResult<bool> {
        let json = serde_json::to_string(targets)?;
        let rows = conn.execute(
            "UPDATE profiles SET targets = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![json, id],
        )?;
        Ok(rows > 0)
    }

    /// List every stored user ID
    pub fn list_ids(conn: &Connection) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT id FROM profiles ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

fn invalid_text(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("invalid {}: {}", column, value).into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!(Sex::from_str("male"), Some(Sex::Male));
        assert_eq!(Sex::from_str("Other"), Some(Sex::Other));
        assert_eq!(Goal::from_str("Lose Weight"), Some(Goal::LoseWeight));
        assert_eq!(Goal::from_str("gain_muscle"), Some(Goal::GainMuscle));
        assert_eq!(ActivityLevel::from_str("Very Active"), Some(ActivityLevel::Active));
        assert_eq!(ActivityLevel::from_str("light"), Some(ActivityLevel::Light));
        assert_eq!(ActivityLevel::from_str("couch"), None);
    }

    #[test]
    fn test_activity_levels_are_ordered() {
        assert!(ActivityLevel::Sedentary < ActivityLevel::Light);
        assert!(ActivityLevel::Moderate < ActivityLevel::Active);
    }

    #[test]
    fn test_targets_blob_keys_and_defaults() {
        let json = serde_json::to_value(Targets::default()).unwrap();
        assert_eq!(json["targetCalories"], 2000);
        assert_eq!(json["maxSodium"], 2300);

        // Missing keys fall back to defaults
        let partial: Targets = serde_json::from_str(r#"{"targetCalories": 1800}"#).unwrap();
        assert_eq!(partial.calories, 1800);
        assert_eq!(partial.cholesterol, 300);
    }

    #[test]
    fn test_record_unlocks_is_monotonic() {
        let mut prefs = Preferences::default();
        let added = prefs.record_unlocks(["first-log", "early-bird"]);
        assert_eq!(added, vec!["first-log", "early-bird"]);

        let added = prefs.record_unlocks(["first-log", "night-owl"]);
        assert_eq!(added, vec!["night-owl"]);
        assert_eq!(prefs.unlocked_awards, vec!["first-log", "early-bird", "night-owl"]);
    }

    #[test]
    fn test_preferences_blob_is_camel_case() {
        let prefs: Preferences =
            serde_json::from_str(r#"{"darkMode": true, "unlockedAwards": ["first-log"]}"#).unwrap();
        assert!(prefs.dark_mode);
        assert!(prefs.notifications);
        assert!(prefs.is_unlocked("first-log"));
    }

    #[test]
    fn test_display_name() {
        let mut profile = Profile::new("u1");
        assert_eq!(profile.display_name(), "Guest User");
        profile.name = "Sam".to_string();
        assert_eq!(profile.display_name(), "Sam");
    }
}
