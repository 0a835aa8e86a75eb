//! Progress report
//!
//! Applies the goal comparator to every nutrient shown on the progress screen.

use serde::Serialize;

use crate::models::{DayLog, Nutrient, Profile, Targets, Unit};
use super::achievements::WATER_GOAL_ML;
use super::aggregate::DayTotals;
use super::compare::{compare, GoalComparison, GoalKind};

/// A nutrient as it appears on the progress screen
#[derive(Debug, Clone, Copy)]
pub struct NutrientGoal {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub kind: GoalKind,
}

const fn goal(nutrient: Nutrient, label: &'static str, kind: GoalKind) -> NutrientGoal {
    NutrientGoal { nutrient, label, kind }
}

/// Headline gauges
pub const MACRO_GOALS: [NutrientGoal; 4] = [
    goal(Nutrient::Calories, "Calories", GoalKind::Target),
    goal(Nutrient::Fat, "Fat", GoalKind::Target),
    goal(Nutrient::Carbs, "Carbs", GoalKind::Target),
    goal(Nutrient::Protein, "Protein", GoalKind::Target),
];

/// Aim to meet or exceed
pub const TARGET_GOALS: [NutrientGoal; 2] = [
    goal(Nutrient::Fiber, "Fiber", GoalKind::Target),
    goal(Nutrient::Protein, "Protein", GoalKind::Target),
];

/// Aim to stay near or below
pub const LIMIT_GOALS: [NutrientGoal; 4] = [
    goal(Nutrient::Sugar, "Added Sugars", GoalKind::Limit),
    goal(Nutrient::Cholesterol, "Cholesterol", GoalKind::Limit),
    goal(Nutrient::Sodium, "Sodium", GoalKind::Limit),
    goal(Nutrient::Fat, "Fat", GoalKind::Limit),
];

/// Target value for a nutrient
pub fn target_for(targets: &Targets, nutrient: Nutrient) -> i64 {
    match nutrient {
        Nutrient::Calories => targets.calories,
        Nutrient::Protein => targets.protein,
        Nutrient::Carbs => targets.carbs,
        Nutrient::Fat => targets.fat,
        Nutrient::Fiber => targets.fiber,
        Nutrient::Sugar => targets.sugar,
        Nutrient::Sodium => targets.sodium,
        Nutrient::Cholesterol => targets.cholesterol,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NutrientProgress {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub unit: Unit,
    #[serde(flatten)]
    pub comparison: GoalComparison,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub date: String,
    pub totals: DayTotals,
    pub macros: Vec<NutrientProgress>,
    pub targets: Vec<NutrientProgress>,
    pub limits: Vec<NutrientProgress>,
    pub water: GoalComparison,
    /// Calories still available today, never negative
    pub calories_remaining: i64,
    /// Any limit currently exceeded
    pub has_violations: bool,
}

fn section(goals: &[NutrientGoal], totals: &DayTotals, targets: &Targets) -> Vec<NutrientProgress> {
    goals
        .iter()
        .map(|g| {
            let unit = g.nutrient.unit();
            NutrientProgress {
                nutrient: g.nutrient,
                label: g.label,
                unit,
                comparison: compare(
                    totals.nutrition.get(g.nutrient),
                    target_for(targets, g.nutrient) as f64,
                    g.kind,
                    unit,
                ),
            }
        })
        .collect()
}

/// Compare one day's totals with the profile's targets
pub fn progress_report(log: &DayLog, profile: &Profile) -> ProgressReport {
    let totals = DayTotals::from_log(log);
    let targets = &profile.targets;

    let limits = section(&LIMIT_GOALS, &totals, targets);
    let has_violations = limits.iter().any(|p| p.comparison.is_over);
    let calories_remaining =
        (targets.calories as f64 - totals.nutrition.calories).max(0.0).round() as i64;

    ProgressReport {
        date: log.date.clone(),
        macros: section(&MACRO_GOALS, &totals, targets),
        targets: section(&TARGET_GOALS, &totals, targets),
        limits,
        water: compare(totals.water_ml as f64, WATER_GOAL_ML as f64, GoalKind::Target, Unit::Ml),
        calories_remaining,
        has_violations,
        totals,
    }
}
