//! View orchestrator.
//!
//! A single tagged state decides which onboarding screen is showing. Like the
//! rest of the core it has no internal thread: shells call the transition
//! methods, feed counter refreshes in, call `tick(now)` for the social-proof
//! drift and poll `drain_events()`.
//!
//! ## State Transitions
//!
//! ```text
//! WelcomeNew -> OnboardingTour    -> MainApp
//!            -> FirstQuestionDemo -> MainApp
//!            -> FreeExploration   -> MainApp | WelcomeNew
//!            -> MainApp
//! WelcomeReturning -> MainApp
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut shell = ViewOrchestrator::mount(&db, &db, Config::load_or_default());
//! shell.choose(WelcomeChoice::GuidedTour)?;
//! shell.tour_skip()?;
//! for event in shell.drain_events() { /* render */ }
//! ```

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::view::{DemoState, MainTab, ViewKind, ViewState, WelcomeChoice};
use crate::counters::{CounterSource, Counters, RefreshTicket};
use crate::engagement::{Engagement, HomePanels};
use crate::error::{Result, TransitionError, TrialError};
use crate::events::{self, EngagementListener, Event};
use crate::flags::{FlagBackend, FlagKey, FlagStore};
use crate::question::{Question, QuestionFilter, QuestionRenderer, QuestionSource, UserAnswer};
use crate::social_proof::SocialProofStats;
use crate::storage::Config;
use crate::trial::{TrialGate, TrialProgress, TrialServe, TrialSession};
use crate::walkthrough::{tooltip_steps, tour_steps, Advance, TooltipFocus, Walkthrough};

type Transition<T = ViewKind> = std::result::Result<T, TransitionError>;

/// Everything the orchestrator needs to resume after a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Navigator {
    state: ViewState,
    #[serde(default)]
    engagement: Engagement,
}

impl Navigator {
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            engagement: Engagement::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn engagement(&self) -> &Engagement {
        &self.engagement
    }
}

/// Onboarding shell over a flag backend and a question source.
pub struct ViewOrchestrator<F, Q> {
    nav: Navigator,
    flags: FlagStore<F>,
    questions: Q,
    config: Config,
    gate: TrialGate,
    events: Vec<Event>,
}

impl<F: FlagBackend, Q: QuestionSource> ViewOrchestrator<F, Q> {
    /// Resolve the initial view from the persisted flags.
    pub fn mount(flags: F, questions: Q, config: Config) -> Self {
        let flags = FlagStore::new(flags);
        let state = if !flags.get(FlagKey::OnboardingCompleted) {
            ViewState::WelcomeNew
        } else if config.engagement.returning_welcome {
            ViewState::WelcomeReturning
        } else {
            main_app_state(&flags)
        };
        tracing::debug!(view = ?state.kind(), "mounted");
        Self::restore(Navigator::new(state), flags.into_backend(), questions, config)
    }

    /// Resume a persisted navigator.
    pub fn restore(navigator: Navigator, flags: F, questions: Q, config: Config) -> Self {
        let gate = match config.trial.seed {
            Some(seed) => TrialGate::new(config.trial.limit).with_seed(seed),
            None => TrialGate::new(config.trial.limit),
        };
        let mut orchestrator = Self {
            nav: navigator,
            flags: FlagStore::new(flags),
            questions,
            config,
            gate,
            events: Vec::new(),
        };
        orchestrator.sync_ticker(Utc::now());
        orchestrator
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current_view(&self) -> ViewKind {
        self.nav.state.kind()
    }

    pub fn state(&self) -> &ViewState {
        &self.nav.state
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn into_navigator(self) -> Navigator {
        self.nav
    }

    pub fn flags(&self) -> &FlagStore<F> {
        &self.flags
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engagement(&self) -> &Engagement {
        &self.nav.engagement
    }

    pub fn counters(&self) -> Counters {
        self.nav.engagement.counters()
    }

    /// Panel visibility, only meaningful on the home tab.
    pub fn home_panels(&self) -> Option<HomePanels> {
        self.nav
            .state
            .is_home()
            .then(|| self.nav.engagement.panels(&self.config.engagement))
    }

    pub fn social_proof(&self) -> Option<SocialProofStats> {
        self.nav.engagement.social_proof()
    }

    pub fn current_tab(&self) -> Option<MainTab> {
        match &self.nav.state {
            ViewState::MainApp { tab, .. } => Some(*tab),
            _ => None,
        }
    }

    /// Active tooltip, if the first-time overlay is showing.
    pub fn overlay(&self) -> Option<TooltipFocus> {
        let ViewState::MainApp {
            tooltips: Some(walk),
            ..
        } = &self.nav.state
        else {
            return None;
        };
        let step = tooltip_steps().into_iter().nth(walk.index())?;
        Some(TooltipFocus {
            step_index: walk.index(),
            step_id: step.id,
            target: step.target,
            placement: step.placement,
        })
    }

    pub fn tour_position(&self) -> Option<Walkthrough> {
        match &self.nav.state {
            ViewState::OnboardingTour { tour } => Some(*tour),
            _ => None,
        }
    }

    pub fn demo(&self) -> Option<&DemoState> {
        match &self.nav.state {
            ViewState::FirstQuestionDemo { demo } => Some(demo),
            _ => None,
        }
    }

    pub fn trial_session(&self) -> Option<&TrialSession> {
        match &self.nav.state {
            ViewState::FreeExploration { session } => Some(session),
            _ => None,
        }
    }

    pub fn trial_progress(&self) -> Option<TrialProgress> {
        self.trial_session().map(TrialSession::progress)
    }

    // ── Welcome ──────────────────────────────────────────────────────

    pub fn choose(&mut self, choice: WelcomeChoice) -> Transition {
        self.require_view(ViewKind::WelcomeNew, "choose")?;
        let next = match choice {
            WelcomeChoice::TryDemo => {
                let demo = match self.pick_demo_question() {
                    Some(question) => DemoState::Ready { question },
                    None => DemoState::Unavailable,
                };
                ViewState::FirstQuestionDemo { demo }
            }
            WelcomeChoice::GuidedTour => ViewState::OnboardingTour {
                tour: Walkthrough::new(tour_steps().len()),
            },
            WelcomeChoice::Skip => {
                self.flags.set(FlagKey::OnboardingCompleted);
                main_app_state(&self.flags)
            }
            WelcomeChoice::ExploreFree => {
                let pool = self.fetch_pool(&self.config.trial.pool_filter());
                ViewState::FreeExploration {
                    session: self.gate.start(pool),
                }
            }
        };
        Ok(self.enter(next))
    }

    pub fn continue_from_returning(&mut self) -> Transition {
        self.require_view(ViewKind::WelcomeReturning, "continue")?;
        let next = main_app_state(&self.flags);
        Ok(self.enter(next))
    }

    // ── Onboarding tour ──────────────────────────────────────────────

    pub fn tour_next(&mut self) -> Transition {
        let now = Utc::now();
        let advance = match &mut self.nav.state {
            ViewState::OnboardingTour { tour } => tour.next(),
            _ => return Err(self.not_available("tour_next")),
        };
        match advance {
            Advance::Moved(step_index) => {
                self.events.push(Event::TourAdvanced { step_index, at: now });
                Ok(self.current_view())
            }
            Advance::Finished => Ok(self.complete_onboarding()),
        }
    }

    pub fn tour_back(&mut self) -> Transition {
        let now = Utc::now();
        let (before, after) = match &mut self.nav.state {
            ViewState::OnboardingTour { tour } => (tour.index(), tour.back()),
            _ => return Err(self.not_available("tour_back")),
        };
        if before != after {
            self.events.push(Event::TourAdvanced {
                step_index: after,
                at: now,
            });
        }
        Ok(self.current_view())
    }

    pub fn tour_skip(&mut self) -> Transition {
        self.require_view(ViewKind::OnboardingTour, "tour_skip")?;
        Ok(self.complete_onboarding())
    }

    // ── First-question demo ──────────────────────────────────────────

    /// Answer the demo question. Any correctness counts as having tried.
    pub fn submit_demo_answer(&mut self, selected: &str) -> Transition<UserAnswer> {
        let question = match &self.nav.state {
            ViewState::FirstQuestionDemo {
                demo: DemoState::Ready { question },
            } => question.clone(),
            _ => return Err(self.not_available("submit_demo_answer")),
        };
        if !question.has_option(selected) {
            return Err(TransitionError::InvalidOption(selected.to_string()));
        }
        let answer = UserAnswer {
            selected: selected.trim().to_ascii_uppercase(),
            correct: question.is_correct(selected),
        };
        self.record_demo_answer(question, answer.clone());
        Ok(answer)
    }

    /// Show the demo question through `renderer`, record the answer and
    /// leave the demo.
    pub fn play_demo(&mut self, renderer: &mut dyn QuestionRenderer) -> Transition<UserAnswer> {
        let question = match &self.nav.state {
            ViewState::FirstQuestionDemo {
                demo: DemoState::Ready { question },
            } => question.clone(),
            _ => return Err(self.not_available("play_demo")),
        };
        let answer = renderer.render(&question);
        self.record_demo_answer(question, answer.clone());
        self.finish_demo()?;
        Ok(answer)
    }

    /// Leave the demo after answering (or when no question was available).
    pub fn finish_demo(&mut self) -> Transition {
        match &self.nav.state {
            ViewState::FirstQuestionDemo {
                demo: DemoState::Answered { .. } | DemoState::Unavailable,
            } => Ok(self.complete_onboarding()),
            _ => Err(self.not_available("finish_demo")),
        }
    }

    pub fn skip_demo(&mut self) -> Transition {
        self.require_view(ViewKind::FirstQuestionDemo, "skip_demo")?;
        Ok(self.complete_onboarding())
    }

    // ── Free exploration ─────────────────────────────────────────────

    pub fn record_trial_answer(&mut self, was_correct: bool) -> Transition<TrialProgress> {
        let now = Utc::now();
        let progress = match &mut self.nav.state {
            ViewState::FreeExploration { session } => session.record_answer(was_correct)?,
            _ => return Err(self.not_available("record_trial_answer")),
        };
        self.events.push(Event::TrialAnswerRecorded { progress, at: now });
        if progress.locked {
            tracing::info!(limit = progress.limit, "free trial locked");
            self.events.push(Event::TrialLocked {
                limit: progress.limit,
                at: now,
            });
        }
        Ok(progress)
    }

    /// Serve the next trial question through `renderer` and record it.
    pub fn play_trial_question(
        &mut self,
        renderer: &mut dyn QuestionRenderer,
    ) -> Transition<(UserAnswer, TrialProgress)> {
        let question = match &self.nav.state {
            ViewState::FreeExploration { session } => match session.next_question() {
                TrialServe::Serve(q) => q.clone(),
                TrialServe::Exhausted => {
                    return Err(TrialError::Exhausted {
                        consumed: session.progress().consumed_count,
                    }
                    .into())
                }
                TrialServe::Locked => {
                    return Err(TrialError::Locked {
                        limit: session.progress().limit,
                    }
                    .into())
                }
            },
            _ => return Err(self.not_available("play_trial_question")),
        };
        let answer = renderer.render(&question);
        let progress = self.record_trial_answer(answer.correct)?;
        Ok((answer, progress))
    }

    /// Back to the welcome screen; onboarding stays incomplete.
    pub fn exit_trial(&mut self) -> Transition {
        self.require_view(ViewKind::FreeExploration, "exit_trial")?;
        Ok(self.enter(ViewState::WelcomeNew))
    }

    /// Hand off to the upgrade flow and drop into the main app.
    ///
    /// Only offered once the trial has locked. The onboarding flag is left
    /// untouched, so the next mount shows the welcome screen again.
    pub fn request_upgrade(&mut self) -> Transition {
        if !self.trial_session().is_some_and(TrialSession::is_locked) {
            return Err(self.not_available("request_upgrade"));
        }
        self.events.push(Event::UpgradeRequested { at: Utc::now() });
        let next = main_app_state(&self.flags);
        Ok(self.enter(next))
    }

    // ── Main app ─────────────────────────────────────────────────────

    pub fn select_tab(&mut self, tab: MainTab) -> Transition<MainTab> {
        let now = Utc::now();
        match &mut self.nav.state {
            ViewState::MainApp { tab: current, .. } => *current = tab,
            _ => return Err(self.not_available("select_tab")),
        }
        self.events.push(Event::TabSelected { tab, at: now });
        self.sync_ticker(now);
        Ok(tab)
    }

    pub fn select_section(&mut self, section: &str) -> Transition<MainTab> {
        self.select_tab(MainTab::for_section(section))
    }

    /// Follow a journey step's call-to-action. Unknown steps land on home.
    pub fn navigate_journey(&mut self, step_id: &str) -> Transition<MainTab> {
        let tab = self
            .nav
            .engagement
            .journey_engine()
            .get(step_id)
            .map_or(MainTab::Home, |step| step.tab());
        self.select_tab(tab)
    }

    pub fn tooltip_next(&mut self) -> Transition<Option<TooltipFocus>> {
        let advance = match &mut self.nav.state {
            ViewState::MainApp {
                tooltips: Some(walk),
                ..
            } => walk.next(),
            _ => return Err(self.not_available("tooltip_next")),
        };
        match advance {
            Advance::Moved(step_index) => {
                let focus = self.overlay();
                if let Some(focus) = &focus {
                    self.events.push(Event::TooltipAdvanced {
                        step_index,
                        target: focus.target.clone(),
                        at: Utc::now(),
                    });
                }
                Ok(focus)
            }
            Advance::Finished => {
                self.dismiss_tooltips();
                Ok(None)
            }
        }
    }

    pub fn tooltip_skip(&mut self) -> Transition<()> {
        match &self.nav.state {
            ViewState::MainApp {
                tooltips: Some(_), ..
            } => {
                self.dismiss_tooltips();
                Ok(())
            }
            _ => Err(self.not_available("tooltip_skip")),
        }
    }

    // ── Counters ─────────────────────────────────────────────────────

    pub fn begin_counter_refresh(&mut self) -> RefreshTicket {
        self.nav.engagement.begin_refresh()
    }

    /// Apply a counter refresh outcome. Superseded tickets and failures are
    /// ignored; the last good snapshot stays.
    pub fn apply_counter_refresh(&mut self, ticket: RefreshTicket, outcome: Result<Counters>) {
        let now = Utc::now();
        let events =
            self.nav
                .engagement
                .apply_refresh(ticket, outcome, &self.config.engagement, now);
        self.events.extend(events);
        self.sync_ticker(now);
    }

    /// Fetch and apply in one go.
    pub fn refresh_counters(
        &mut self,
        source: &dyn CounterSource,
        identity: Option<&str>,
    ) -> Counters {
        let ticket = self.begin_counter_refresh();
        let outcome = source.fetch_counters(identity);
        self.apply_counter_refresh(ticket, outcome);
        self.counters()
    }

    // ── Timers and events ────────────────────────────────────────────

    /// Drive the social-proof drift. Returns the new numbers when they moved.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SocialProofStats> {
        let event = self.nav.engagement.tick(now)?;
        let stats = match &event {
            Event::SocialProofUpdated { stats, .. } => Some(*stats),
            _ => None,
        };
        self.events.push(event);
        stats
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Drain pending events into `listener` and hand them back.
    pub fn dispatch_events(&mut self, listener: &mut dyn EngagementListener) -> Vec<Event> {
        let drained = self.drain_events();
        events::dispatch(&drained, listener);
        drained
    }

    // ── Internals ────────────────────────────────────────────────────

    fn not_available(&self, action: &'static str) -> TransitionError {
        TransitionError::NotAvailable {
            view: self.current_view(),
            action,
        }
    }

    fn require_view(&self, view: ViewKind, action: &'static str) -> Transition<()> {
        if self.current_view() == view {
            Ok(())
        } else {
            Err(self.not_available(action))
        }
    }

    fn enter(&mut self, next: ViewState) -> ViewKind {
        let now = Utc::now();
        let from = self.current_view();
        let to = next.kind();
        self.nav.state = next;
        if from != to {
            tracing::debug!(?from, ?to, "view changed");
            self.events.push(Event::ViewChanged { from, to, at: now });
        }
        self.sync_ticker(now);
        to
    }

    fn complete_onboarding(&mut self) -> ViewKind {
        self.flags.set(FlagKey::OnboardingCompleted);
        let next = main_app_state(&self.flags);
        self.enter(next)
    }

    fn dismiss_tooltips(&mut self) {
        if let ViewState::MainApp { tooltips, .. } = &mut self.nav.state {
            *tooltips = None;
        }
        self.flags.set(FlagKey::TooltipsSeen);
        self.events.push(Event::OverlayDismissed { at: Utc::now() });
    }

    fn record_demo_answer(&mut self, question: Question, answer: UserAnswer) {
        self.events.push(Event::DemoAnswered {
            question_id: question.id.clone(),
            selected: answer.selected.clone(),
            correct: answer.correct,
            at: Utc::now(),
        });
        self.nav.state = ViewState::FirstQuestionDemo {
            demo: DemoState::Answered { question, answer },
        };
    }

    fn sync_ticker(&mut self, now: DateTime<Utc>) {
        let home = self.nav.state.is_home();
        self.nav
            .engagement
            .sync_ticker(home, &self.config.engagement, now);
    }

    fn fetch_pool(&self, filter: &QuestionFilter) -> Vec<Question> {
        self.questions.fetch_question_pool(filter).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "question pool unavailable");
            Vec::new()
        })
    }

    fn pick_demo_question(&self) -> Option<Question> {
        let mut pool = self.fetch_pool(&self.config.demo.filter());
        let mut rng = match self.config.trial.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        pool.shuffle(&mut rng);
        pool.into_iter().next()
    }
}

/// Main app on the home tab, with tooltips armed if they were never seen.
fn main_app_state<F: FlagBackend>(flags: &FlagStore<F>) -> ViewState {
    let tooltips =
        (!flags.get(FlagKey::TooltipsSeen)).then(|| Walkthrough::new(tooltip_steps().len()));
    ViewState::MainApp {
        tab: MainTab::Home,
        tooltips,
    }
}
