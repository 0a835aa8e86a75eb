//! Data models
//!
//! Rust structs representing stored entities and the in-memory day log.

mod day_log;
mod food_entry;
mod nutrition;
mod profile;
mod water_entry;

pub use day_log::{DayLog, LogError};
pub use food_entry::{local_hour, FoodLogEntry, MealType};
pub use nutrition::{Nutrient, Nutrition, Unit};
pub use profile::{
    ActivityLevel, BodyStats, Goal, Preferences, Profile, ProfileError, Sex, Targets,
};
pub use water_entry::WaterEntry;
