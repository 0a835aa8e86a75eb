//! Goal comparison
//!
//! Turns a current amount and a target into display data: bar percentage,
//! remaining amount, over/under flag and a short status label.

use serde::{Deserialize, Serialize};

use crate::models::Unit;
use super::targets::round_half_up;

/// How a nutrient's target is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    /// Meet or exceed; going over is informational only
    Target,
    /// Stay at or below; going over is a violation
    Limit,
}

/// Result of comparing a current amount with its goal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalComparison {
    pub current: f64,
    pub max: f64,
    pub kind: GoalKind,
    /// Bar width, clamped to 0..=100
    pub percentage: f64,
    /// Unclamped percentage of goal, rounded
    pub status_percent: i64,
    /// `max - current`, negative when over
    pub remaining: f64,
    /// Only ever true for limits
    pub is_over: bool,
    pub status_label: String,
}

/// Compare `current` with `max`.
///
/// A goal of zero (or less) reports 0% rather than dividing by it.
pub fn compare(current: f64, max: f64, kind: GoalKind, unit: Unit) -> GoalComparison {
    let ratio = if max > 0.0 { Some(current / max * 100.0) } else { None };
    let percentage = ratio.map_or(0.0, |r| r.clamp(0.0, 100.0));
    let status_percent = ratio.map_or(0, |r| round_half_up(r) as i64);

    let remaining = max - current;
    let (is_over, shows_left) = match kind {
        GoalKind::Target => (false, remaining > 0.0),
        GoalKind::Limit => (current > max, remaining >= 0.0),
    };

    let status_label = if shows_left {
        format!("{}{} left", round_half_up(remaining) as i64, unit.as_str())
    } else {
        format!("{}{} over", round_half_up(remaining.abs()) as i64, unit.as_str())
    };

    GoalComparison {
        current,
        max,
        kind,
        percentage,
        status_percent,
        remaining,
        is_over,
        status_label,
    }
}
