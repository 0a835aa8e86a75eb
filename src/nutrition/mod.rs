//! Nutrition engine
//!
//! Target calculation, daily aggregation, goal comparison and achievements.
//! Everything here is pure; storage lives in `models` and `tools`.

pub mod achievements;
pub mod aggregate;
pub mod compare;
pub mod progress;
pub mod targets;

pub use achievements::{celebration, evaluate, Achievement, ACHIEVEMENTS, WATER_GOAL_ML};
pub use aggregate::{aggregate, aggregate_water, DayTotals};
pub use compare::{compare, GoalComparison, GoalKind};
pub use progress::{progress_report, NutrientProgress, ProgressReport};
pub use targets::{compute_targets, round_half_up};
