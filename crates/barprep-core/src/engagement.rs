//! Home-tab engagement: counters, milestone ledgers, panel visibility and the
//! social-proof banner.
//!
//! Engines run on every applied counter refresh so the ledgers always reflect
//! the newest snapshot. Celebration events are only produced for panels that
//! are visible under that snapshot; a crossing on a hidden panel is recorded
//! silently and never celebrated later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{Achievement, AchievementEngine};
use crate::counters::{CounterCache, Counters, RefreshTicket};
use crate::error::Result;
use crate::events::Event;
use crate::journey::{JourneyEngine, JourneyProgress, JourneyStep};
use crate::milestone::MilestoneLedger;
use crate::social_proof::{SocialProofStats, SocialProofTicker};
use crate::storage::EngagementConfig;

/// Which home-tab panels are shown for a counter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePanels {
    pub achievements: bool,
    pub journey: bool,
    pub social_proof: bool,
}

impl HomePanels {
    pub fn for_counters(counters: &Counters, config: &EngagementConfig) -> Self {
        let answered = counters.questions_answered;
        Self {
            achievements: answered <= config.achievements_ceiling,
            journey: answered <= config.journey_ceiling,
            social_proof: answered <= config.social_proof_ceiling,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Engagement {
    counters: CounterCache,
    achievements: MilestoneLedger,
    journey: MilestoneLedger,
    #[serde(skip)]
    achievement_engine: AchievementEngine,
    #[serde(skip)]
    journey_engine: JourneyEngine,
    #[serde(skip)]
    ticker: Option<SocialProofTicker>,
}

impl Engagement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> Counters {
        self.counters.current()
    }

    pub fn panels(&self, config: &EngagementConfig) -> HomePanels {
        HomePanels::for_counters(&self.counters(), config)
    }

    pub fn achievement_ledger(&self) -> &MilestoneLedger {
        &self.achievements
    }

    pub fn journey_ledger(&self) -> &MilestoneLedger {
        &self.journey
    }

    pub fn achievement_engine(&self) -> &AchievementEngine {
        &self.achievement_engine
    }

    pub fn journey_engine(&self) -> &JourneyEngine {
        &self.journey_engine
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.achievement_engine.achievements(&self.achievements)
    }

    pub fn journey(&self) -> Vec<JourneyStep> {
        self.journey_engine.journey(&self.journey)
    }

    pub fn journey_progress(&self) -> JourneyProgress {
        self.journey_engine.progress(&self.journey)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.counters.begin_refresh()
    }

    /// Apply a refresh outcome and evaluate both engines against the result.
    ///
    /// Returns the events to publish. Superseded or failed refreshes
    /// produce none.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        outcome: Result<Counters>,
        config: &EngagementConfig,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let Some(counters) = self.counters.complete_refresh(ticket, outcome) else {
            return Vec::new();
        };

        let mut events = vec![Event::CountersRefreshed { counters, at: now }];
        let panels = HomePanels::for_counters(&counters, config);

        let achieved = self.achievement_engine.evaluate(&counters, &self.achievements);
        self.achievements = achieved.ledger;
        for id in &achieved.fired {
            let Some(def) = self.achievement_engine.get(id) else {
                continue;
            };
            if !panels.achievements {
                tracing::debug!(id = %id, "achievement recorded while panel hidden");
                continue;
            }
            tracing::info!(id = %id, points = def.points, "achievement unlocked");
            events.push(Event::AchievementUnlocked {
                id: def.id.clone(),
                title: def.title.clone(),
                celebration: def.celebration,
                points: def.points,
                at: now,
            });
        }

        let progressed = self.journey_engine.evaluate(&counters, &self.journey);
        self.journey = progressed.ledger;
        if panels.journey {
            for id in &progressed.completed {
                let points = self.journey_engine.get(id).map_or(0, |s| s.points);
                tracing::info!(id = %id, points, "journey step completed");
                events.push(Event::JourneyStepCompleted {
                    id: id.clone(),
                    points,
                    at: now,
                });
            }
            if let Some(total_points) = progressed.journey_complete {
                tracing::info!(total_points, "journey completed");
                events.push(Event::JourneyCompleted {
                    total_points,
                    at: now,
                });
            }
        } else if !progressed.completed.is_empty() {
            tracing::debug!(
                steps = progressed.completed.len(),
                "journey steps recorded while panel hidden"
            );
        }

        events
    }

    /// Keep the social-proof ticker alive only while its panel is on screen.
    ///
    /// `home_visible` is whether the home tab is the one being shown.
    pub fn sync_ticker(
        &mut self,
        home_visible: bool,
        config: &EngagementConfig,
        now: DateTime<Utc>,
    ) {
        let wanted = home_visible && self.panels(config).social_proof;
        match (wanted, self.ticker.is_some()) {
            (true, false) => {
                let interval = config.social_proof_interval();
                self.ticker = Some(SocialProofTicker::new(now, interval, None));
                tracing::debug!("social proof ticker started");
            }
            (false, true) => {
                self.ticker = None;
                tracing::debug!("social proof ticker released");
            }
            _ => {}
        }
    }

    pub fn social_proof(&self) -> Option<SocialProofStats> {
        self.ticker.as_ref().map(SocialProofTicker::stats)
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let stats = self.ticker.as_mut()?.tick(now)?;
        Some(Event::SocialProofUpdated { stats, at: now })
    }
}
