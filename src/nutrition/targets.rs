//! Daily target calculation
//!
//! Mifflin-St Jeor basal rate, a fixed activity multiplier, a goal offset and
//! a fixed 30/40/30 protein/carbs/fat split of the resulting calories.

use crate::models::{ActivityLevel, BodyStats, Goal, ProfileError, Sex, Targets};

/// kcal per gram of protein or carbohydrate
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
/// kcal per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

pub const PROTEIN_SHARE: f64 = 0.30;
pub const CARBS_SHARE: f64 = 0.40;
pub const FAT_SHARE: f64 = 0.30;

/// Round half up (2.5 -> 3, -2.5 -> -2)
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Activity multiplier applied to the basal rate
pub fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
    }
}

/// Calorie offset applied after the activity multiplier
pub fn goal_adjustment(goal: Goal) -> f64 {
    match goal {
        Goal::LoseWeight => -500.0,
        Goal::Maintain => 0.0,
        Goal::GainMuscle => 300.0,
    }
}

/// Basal metabolic rate in kcal/day.
///
/// Only `Male` takes the +5 branch; every other category uses -161.
pub fn basal_rate(stats: &BodyStats) -> f64 {
    let base = 10.0 * stats.weight_kg + 6.25 * stats.height_cm - 5.0 * stats.age as f64;
    match stats.sex {
        Sex::Male => base + 5.0,
        Sex::Female | Sex::Other => base - 161.0,
    }
}

fn validate(stats: &BodyStats) -> Result<(), ProfileError> {
    if stats.age <= 0 {
        return Err(ProfileError::InvalidBodyStats(format!(
            "age must be greater than 0, got {}",
            stats.age
        )));
    }
    if !stats.height_cm.is_finite() || stats.height_cm <= 0.0 {
        return Err(ProfileError::InvalidBodyStats(format!(
            "height must be greater than 0 cm, got {}",
            stats.height_cm
        )));
    }
    if !stats.weight_kg.is_finite() || stats.weight_kg <= 0.0 {
        return Err(ProfileError::InvalidBodyStats(format!(
            "weight must be greater than 0 kg, got {}",
            stats.weight_kg
        )));
    }
    Ok(())
}

/// Derive daily calorie and macro targets.
///
/// Fiber, sugar, sodium and cholesterol are copied from `current` unchanged.
pub fn compute_targets(stats: &BodyStats, current: &Targets) -> Result<Targets, ProfileError> {
    validate(stats)?;

    let tdee = basal_rate(stats) * activity_factor(stats.activity_level) + goal_adjustment(stats.goal);
    let calories = round_half_up(tdee) as i64;
    if calories <= 0 {
        return Err(ProfileError::NonPositiveCalories(calories));
    }

    let kcal = calories as f64;
    Ok(Targets {
        calories,
        protein: round_half_up(kcal * PROTEIN_SHARE / KCAL_PER_G_PROTEIN) as i64,
        carbs: round_half_up(kcal * CARBS_SHARE / KCAL_PER_G_CARBS) as i64,
        fat: round_half_up(kcal * FAT_SHARE / KCAL_PER_G_FAT) as i64,
        ..*current
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(sex: Sex, goal: Goal, activity_level: ActivityLevel) -> BodyStats {
        BodyStats {
            age: 25,
            sex,
            height_cm: 175.0,
            weight_kg: 70.0,
            goal,
            activity_level,
        }
    }

    #[test]
    fn test_reference_profile() {
        let s = stats(Sex::Male, Goal::LoseWeight, ActivityLevel::Moderate);
        assert!((basal_rate(&s) - 1673.75).abs() < 1e-9);

        let t = compute_targets(&s, &Targets::default()).unwrap();
        assert_eq!(t.calories, 2094);
        assert_eq!(t.protein, 157);
        assert_eq!(t.carbs, 209);
        assert_eq!(t.fat, 70);
    }

    #[test]
    fn test_non_male_categories_share_branch() {
        let female = stats(Sex::Female, Goal::Maintain, ActivityLevel::Sedentary);
        let other = stats(Sex::Other, Goal::Maintain, ActivityLevel::Sedentary);
        assert!((basal_rate(&female) - 1507.75).abs() < 1e-9);
        assert_eq!(
            compute_targets(&female, &Targets::default()),
            compute_targets(&other, &Targets::default())
        );
        // 1507.75 * 1.2 = 1809.3
        assert_eq!(compute_targets(&female, &Targets::default()).unwrap().calories, 1809);
    }

    #[test]
    fn test_goal_adjustments() {
        let maintain = compute_targets(
            &stats(Sex::Male, Goal::Maintain, ActivityLevel::Active),
            &Targets::default(),
        )
        .unwrap();
        let gain = compute_targets(
            &stats(Sex::Male, Goal::GainMuscle, ActivityLevel::Active),
            &Targets::default(),
        )
        .unwrap();
        assert_eq!(gain.calories - maintain.calories, 300);
    }

    #[test]
    fn test_micronutrient_targets_are_kept() {
        let current = Targets {
            fiber: 38,
            sugar: 25,
            sodium: 1500,
            cholesterol: 200,
            ..Targets::default()
        };
        let t = compute_targets(
            &stats(Sex::Female, Goal::LoseWeight, ActivityLevel::Light),
            &current,
        )
        .unwrap();
        assert_eq!(t.fiber, 38);
        assert_eq!(t.sugar, 25);
        assert_eq!(t.sodium, 1500);
        assert_eq!(t.cholesterol, 200);
    }

    #[test]
    fn test_is_deterministic_and_macros_add_up() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
        ];
        for sex in [Sex::Male, Sex::Female] {
            for goal in [Goal::LoseWeight, Goal::Maintain, Goal::GainMuscle] {
                for level in levels {
                    let s = stats(sex, goal, level);
                    let a = compute_targets(&s, &Targets::default()).unwrap();
                    let b = compute_targets(&s, &Targets::default()).unwrap();
                    assert_eq!(a, b);

                    // Each rounding is off by at most half a gram: 4*0.5 + 4*0.5 + 9*0.5
                    let from_macros = a.protein * 4 + a.carbs * 4 + a.fat * 9;
                    assert!(
                        (from_macros - a.calories).abs() <= 8,
                        "{:?}: {} vs {}",
                        s,
                        from_macros,
                        a.calories
                    );
                }
            }
        }
    }

    #[test]
    fn test_rejects_non_physical_stats() {
        let mut s = stats(Sex::Male, Goal::Maintain, ActivityLevel::Moderate);
        s.weight_kg = 0.0;
        assert!(matches!(
            compute_targets(&s, &Targets::default()),
            Err(ProfileError::InvalidBodyStats(_))
        ));

        let mut s = stats(Sex::Male, Goal::Maintain, ActivityLevel::Moderate);
        s.height_cm = f64::NAN;
        assert!(compute_targets(&s, &Targets::default()).is_err());

        let mut s = stats(Sex::Male, Goal::Maintain, ActivityLevel::Moderate);
        s.age = 0;
        assert!(compute_targets(&s, &Targets::default()).is_err());
    }

    #[test]
    fn test_rejects_non_positive_calories() {
        let s = BodyStats {
            age: 120,
            sex: Sex::Female,
            height_cm: 40.0,
            weight_kg: 3.0,
            goal: Goal::LoseWeight,
            activity_level: ActivityLevel::Sedentary,
        };
        assert!(matches!(
            compute_targets(&s, &Targets::default()),
            Err(ProfileError::NonPositiveCalories(_))
        ));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
    }
}
