//! Profile tools
//!
//! Onboarding, profile edits, nutrient limits, preferences and the premium flag.
//! Any change to body stats or goal re-derives the calorie and macro targets.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Database;
use crate::flow::{landing_for, ViewState};
use crate::models::{ActivityLevel, Goal, Preferences, Profile, Sex};
use super::persist::persist_profile;
use super::session::Session;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub display_name: String,
    /// Screen this profile should land on
    pub view: ViewState,
    /// False when the change only exists in memory (guest or failed write)
    pub saved: bool,
}

impl ProfileResponse {
    fn new(profile: Profile, saved: bool) -> Self {
        Self {
            display_name: profile.display_name().to_string(),
            view: landing_for(profile.has_onboarded, profile.is_premium),
            profile,
            saved,
        }
    }
}

/// Answers collected by the onboarding screens
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingInput {
    pub name: Option<String>,
    pub age: i64,
    pub sex: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub goal: String,
    pub activity_level: String,
}

/// Partial profile edit; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
}

/// Micronutrient targets and limits the user sets directly
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsUpdate {
    pub fiber: Option<i64>,
    pub sugar: Option<i64>,
    pub sodium: Option<i64>,
    pub cholesterol: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub weekly_reports: Option<bool>,
    pub health_sync: Option<bool>,
}

fn parse_sex(s: &str) -> Result<Sex, String> {
    Sex::from_str(s).ok_or_else(|| format!("Unknown sex '{}', expected Male, Female or Other", s))
}

fn parse_goal(s: &str) -> Result<Goal, String> {
    Goal::from_str(s).ok_or_else(|| {
        format!("Unknown goal '{}', expected Lose Weight, Maintain or Gain Muscle", s)
    })
}

fn parse_activity(s: &str) -> Result<ActivityLevel, String> {
    ActivityLevel::from_str(s).ok_or_else(|| {
        format!(
            "Unknown activity level '{}', expected Sedentary, Lightly Active, Moderately Active or Very Active",
            s
        )
    })
}

/// Cache the profile and hand it to storage
fn commit(db: &Database, session: &mut Session, profile: Profile) -> Result<ProfileResponse, String> {
    let saved = persist_profile(db, &session.ctx, &profile);
    session.set_profile(profile.clone());
    Ok(ProfileResponse::new(profile, saved))
}

fn recalculate(profile: Profile) -> Result<Profile, String> {
    let profile = profile.recalculate().map_err(|e| e.to_string())?;
    info!(
        calories = profile.targets.calories,
        protein = profile.targets.protein,
        carbs = profile.targets.carbs,
        fat = profile.targets.fat,
        "Recalculated targets"
    );
    Ok(profile)
}

pub fn get_profile(db: &Database, session: &mut Session) -> Result<ProfileResponse, String> {
    let profile = session.profile(db)?;
    let saved = !session.ctx.guest;
    Ok(ProfileResponse::new(profile, saved))
}

pub fn complete_onboarding(
    db: &Database,
    session: &mut Session,
    input: OnboardingInput,
) -> Result<ProfileResponse, String> {
    let mut profile = session.profile(db)?;

    if let Some(name) = input.name {
        profile.name = name.trim().to_string();
    }
    profile.age = input.age;
    profile.sex = parse_sex(&input.sex)?;
    profile.height_cm = input.height_cm;
    profile.weight_kg = input.weight_kg;
    profile.goal = parse_goal(&input.goal)?;
    profile.activity_level = parse_activity(&input.activity_level)?;

    let mut profile = recalculate(profile)?;
    profile.has_onboarded = true;
    commit(db, session, profile)
}

pub fn update_profile(
    db: &Database,
    session: &mut Session,
    update: ProfileUpdate,
) -> Result<ProfileResponse, String> {
    let mut profile = session.profile(db)?;

    if let Some(name) = update.name {
        profile.name = name.trim().to_string();
    }
    if let Some(age) = update.age {
        profile.age = age;
    }
    if let Some(sex) = update.sex.as_deref() {
        profile.sex = parse_sex(sex)?;
    }
    if let Some(height) = update.height_cm {
        profile.height_cm = height;
    }
    if let Some(weight) = update.weight_kg {
        profile.weight_kg = weight;
    }
    if let Some(goal) = update.goal.as_deref() {
        profile.goal = parse_goal(goal)?;
    }
    if let Some(activity) = update.activity_level.as_deref() {
        profile.activity_level = parse_activity(activity)?;
    }

    let stats_changed = profile.body_stats() != session.profile(db)?.body_stats();
    let profile = if stats_changed { recalculate(profile)? } else { profile };
    commit(db, session, profile)
}

pub fn set_nutrient_limits(
    db: &Database,
    session: &mut Session,
    update: LimitsUpdate,
) -> Result<ProfileResponse, String> {
    let mut profile = session.profile(db)?;
    let fields = [
        ("fiber", update.fiber, &mut profile.targets.fiber),
        ("sugar", update.sugar, &mut profile.targets.sugar),
        ("sodium", update.sodium, &mut profile.targets.sodium),
        ("cholesterol", update.cholesterol, &mut profile.targets.cholesterol),
    ];
    for (name, value, slot) in fields {
        if let Some(v) = value {
            if v < 0 {
                return Err(format!("{} must not be negative, got {}", name, v));
            }
            *slot = v;
        }
    }
    commit(db, session, profile)
}

pub fn set_preferences(
    db: &Database,
    session: &mut Session,
    update: PreferencesUpdate,
) -> Result<ProfileResponse, String> {
    let mut profile = session.profile(db)?;
    let Preferences {
        dark_mode,
        notifications,
        weekly_reports,
        health_sync,
        ..
    } = &mut profile.preferences;

    for (value, slot) in [
        (update.dark_mode, dark_mode),
        (update.notifications, notifications),
        (update.weekly_reports, weekly_reports),
        (update.health_sync, health_sync),
    ] {
        if let Some(v) = value {
            *slot = v;
        }
    }
    commit(db, session, profile)
}

/// Mark the user as premium
pub fn subscribe(db: &Database, session: &mut Session) -> Result<ProfileResponse, String> {
    let mut profile = session.profile(db)?;
    if !profile.has_onboarded {
        return Err("Complete onboarding before subscribing".to_string());
    }
    profile.is_premium = true;
    info!(user = %session.ctx.user_id, "Subscribed");
    commit(db, session, profile)
}
