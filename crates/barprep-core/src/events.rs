use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::Celebration;
use crate::counters::Counters;
use crate::orchestrator::{MainTab, ViewKind};
use crate::social_proof::SocialProofStats;
use crate::trial::TrialProgress;

/// Every state change in the orchestrator produces an Event.
/// Shells poll for events; listeners get the engagement subset as callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ViewChanged {
        from: ViewKind,
        to: ViewKind,
        at: DateTime<Utc>,
    },
    TourAdvanced {
        step_index: usize,
        at: DateTime<Utc>,
    },
    TooltipAdvanced {
        step_index: usize,
        target: String,
        at: DateTime<Utc>,
    },
    /// The tooltip overlay went away (finished or skipped).
    OverlayDismissed {
        at: DateTime<Utc>,
    },
    TabSelected {
        tab: MainTab,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        id: String,
        title: String,
        celebration: Celebration,
        points: u32,
        at: DateTime<Utc>,
    },
    JourneyStepCompleted {
        id: String,
        points: u32,
        at: DateTime<Utc>,
    },
    JourneyCompleted {
        total_points: u32,
        at: DateTime<Utc>,
    },
    DemoAnswered {
        question_id: String,
        selected: String,
        correct: bool,
        at: DateTime<Utc>,
    },
    TrialAnswerRecorded {
        progress: TrialProgress,
        at: DateTime<Utc>,
    },
    /// Free quota used up; the paywall is showing.
    TrialLocked {
        limit: usize,
        at: DateTime<Utc>,
    },
    UpgradeRequested {
        at: DateTime<Utc>,
    },
    CountersRefreshed {
        counters: Counters,
        at: DateTime<Utc>,
    },
    SocialProofUpdated {
        stats: SocialProofStats,
        at: DateTime<Utc>,
    },
}

/// Callbacks for shells that prefer push over polling.
///
/// All methods default to no-ops. Milestones crossed while their home panel
/// is hidden are recorded without an event, so each one reaches a listener
/// at most once.
pub trait EngagementListener {
    fn on_view_changed(&mut self, _from: ViewKind, _to: ViewKind) {}
    fn on_achievement_fired(&mut self, _id: &str) {}
    fn on_journey_step_completed(&mut self, _id: &str) {}
    fn on_journey_complete(&mut self, _total_points: u32) {}
}

/// Forward the listener-relevant events, in order.
pub fn dispatch(events: &[Event], listener: &mut dyn EngagementListener) {
    for event in events {
        match event {
            Event::ViewChanged { from, to, .. } => listener.on_view_changed(*from, *to),
            Event::AchievementUnlocked { id, .. } => listener.on_achievement_fired(id),
            Event::JourneyStepCompleted { id, .. } => listener.on_journey_step_completed(id),
            Event::JourneyCompleted { total_points, .. } => {
                listener.on_journey_complete(*total_points)
            }
            _ => {}
        }
    }
}
