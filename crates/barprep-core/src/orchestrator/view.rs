//! View states of the onboarding shell.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::question::{Question, UserAnswer};
use crate::trial::TrialSession;
use crate::walkthrough::Walkthrough;

/// Fieldless mirror of [`ViewState`], for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    WelcomeNew,
    WelcomeReturning,
    OnboardingTour,
    FirstQuestionDemo,
    FreeExploration,
    MainApp,
}

/// Tabs of the main application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainTab {
    #[default]
    Home,
    Simulado,
    Areas,
    Performance,
    Profile,
}

impl MainTab {
    pub fn as_str(self) -> &'static str {
        match self {
            MainTab::Home => "home",
            MainTab::Simulado => "simulado",
            MainTab::Areas => "areas",
            MainTab::Performance => "performance",
            MainTab::Profile => "profile",
        }
    }

    /// Tab for a navigation target. Unknown targets land on home.
    pub fn for_section(section: &str) -> Self {
        match section.trim().to_ascii_lowercase().as_str() {
            "profile" => MainTab::Profile,
            "questions" | "areas" | "study" => MainTab::Areas,
            "advanced" | "performance" => MainTab::Performance,
            "simulado" => MainTab::Simulado,
            other => {
                if other != "home" {
                    tracing::debug!(section = other, "unknown section, falling back to home");
                }
                MainTab::Home
            }
        }
    }
}

impl FromStr for MainTab {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::for_section(s))
    }
}

impl std::fmt::Display for MainTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options on the new-visitor welcome screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeChoice {
    TryDemo,
    GuidedTour,
    Skip,
    ExploreFree,
}

impl FromStr for WelcomeChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "try_demo" | "demo" => Ok(WelcomeChoice::TryDemo),
            "guided_tour" | "tour" => Ok(WelcomeChoice::GuidedTour),
            "skip" => Ok(WelcomeChoice::Skip),
            "explore_free" | "explore" | "trial" => Ok(WelcomeChoice::ExploreFree),
            other => Err(format!("unknown welcome choice: {other}")),
        }
    }
}

/// Progress through the single demo question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DemoState {
    Ready { question: Question },
    Answered { question: Question, answer: UserAnswer },
    /// The question source had nothing to offer.
    Unavailable,
}

/// The one active view, with whatever state only that view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewState {
    WelcomeNew,
    WelcomeReturning,
    OnboardingTour {
        tour: Walkthrough,
    },
    FirstQuestionDemo {
        demo: DemoState,
    },
    FreeExploration {
        session: TrialSession,
    },
    MainApp {
        tab: MainTab,
        /// First-time tooltips overlay, when active.
        #[serde(default)]
        tooltips: Option<Walkthrough>,
    },
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewState::WelcomeNew => ViewKind::WelcomeNew,
            ViewState::WelcomeReturning => ViewKind::WelcomeReturning,
            ViewState::OnboardingTour { .. } => ViewKind::OnboardingTour,
            ViewState::FirstQuestionDemo { .. } => ViewKind::FirstQuestionDemo,
            ViewState::FreeExploration { .. } => ViewKind::FreeExploration,
            ViewState::MainApp { .. } => ViewKind::MainApp,
        }
    }

    /// Whether the home tab is on screen.
    pub fn is_home(&self) -> bool {
        matches!(
            self,
            ViewState::MainApp {
                tab: MainTab::Home,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_map_to_tabs() {
        assert_eq!(MainTab::for_section("profile"), MainTab::Profile);
        assert_eq!(MainTab::for_section("questions"), MainTab::Areas);
        assert_eq!(MainTab::for_section("study"), MainTab::Areas);
        assert_eq!(MainTab::for_section("advanced"), MainTab::Performance);
        assert_eq!(MainTab::for_section("Simulado"), MainTab::Simulado);
        assert_eq!(MainTab::for_section("nowhere"), MainTab::Home);
        assert_eq!("".parse::<MainTab>().unwrap(), MainTab::Home);
    }

    #[test]
    fn welcome_choice_parses_aliases() {
        assert_eq!("try-demo".parse(), Ok(WelcomeChoice::TryDemo));
        assert_eq!("tour".parse(), Ok(WelcomeChoice::GuidedTour));
        assert_eq!("explore".parse(), Ok(WelcomeChoice::ExploreFree));
        assert!("later".parse::<WelcomeChoice>().is_err());
    }

    #[test]
    fn view_state_roundtrips_through_json() {
        let state = ViewState::MainApp {
            tab: MainTab::Areas,
            tooltips: Some(Walkthrough::new(3)),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.kind(), ViewKind::MainApp);
        assert!(!back.is_home());
    }
}
