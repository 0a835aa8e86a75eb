//! Screen flow
//!
//! The app's screens as a finite-state machine. The view layer asks
//! `transition` where to go next instead of checking flags ad hoc.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    Onboarding,
    Auth,
    Paywall,
    Dashboard,
    Progress,
    Camera,
    Review,
    Profile,
    Awards,
}

impl ViewState {
    /// Screens reachable from the tab bar
    pub fn is_tab(&self) -> bool {
        matches!(
            self,
            ViewState::Dashboard | ViewState::Progress | ViewState::Profile | ViewState::Awards
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    OnboardingCompleted,
    AuthSucceeded,
    Subscribed,
    ProfileLoaded { has_onboarded: bool, is_premium: bool },
    ProfileMissing,
    Navigate { to: ViewState },
    PhotoSelected,
    AnalysisFinished,
    AnalysisFailed,
    FoodSaved,
    ReviewCancelled,
    SignedOut,
}

/// Where a loaded profile lands
pub fn landing_for(has_onboarded: bool, is_premium: bool) -> ViewState {
    match (has_onboarded, is_premium) {
        (true, true) => ViewState::Dashboard,
        (true, false) => ViewState::Paywall,
        (false, _) => ViewState::Onboarding,
    }
}

/// Next screen for `event` in `state`, or `None` if the event is not allowed there
pub fn transition(state: ViewState, event: ViewEvent) -> Option<ViewState> {
    use ViewEvent as E;
    use ViewState as S;

    match (state, event) {
        (_, E::SignedOut) | (_, E::ProfileMissing) => Some(S::Onboarding),
        (_, E::ProfileLoaded { has_onboarded, is_premium }) => {
            Some(landing_for(has_onboarded, is_premium))
        }

        (S::Onboarding, E::OnboardingCompleted) => Some(S::Auth),
        (S::Auth, E::AuthSucceeded) => Some(S::Paywall),
        (S::Paywall, E::Subscribed) => Some(S::Dashboard),

        (from, E::Navigate { to }) if from.is_tab() && to.is_tab() => Some(to),
        (from, E::PhotoSelected) if from.is_tab() => Some(S::Camera),

        (S::Camera, E::AnalysisFinished) => Some(S::Review),
        (S::Camera, E::AnalysisFailed) => Some(S::Dashboard),
        (S::Review, E::FoodSaved) | (S::Review, E::ReviewCancelled) => Some(S::Dashboard),

        _ => None,
    }
}
