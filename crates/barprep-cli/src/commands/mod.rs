//! Subcommands and the shell state they share between runs.

use barprep_core::journey::JourneyProgress;
use barprep_core::{
    Config, Counters, Database, DemoState, Event, HomePanels, MainTab, Navigator, Question,
    SocialProofStats, TooltipFocus, TrialProgress, ViewKind, ViewOrchestrator,
};
use serde::Serialize;

pub mod config;
pub mod demo;
pub mod flags;
pub mod progress;
pub mod questions;
pub mod study;
pub mod tab;
pub mod tooltips;
pub mod tour;
pub mod trial;
pub mod view;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// kv key holding the serialized navigator.
pub const NAVIGATOR_KEY: &str = "navigator";

pub type Shell<'a> = ViewOrchestrator<&'a Database, &'a Database>;

fn load_navigator(db: &Database) -> Option<Navigator> {
    let json = match db.kv_get(NAVIGATOR_KEY) {
        Ok(json) => json?,
        Err(e) => {
            tracing::warn!(error = %e, "could not read saved navigator");
            return None;
        }
    };
    match serde_json::from_str::<Navigator>(&json) {
        Ok(nav) => Some(nav),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable navigator");
            None
        }
    }
}

/// Resume the saved shell, or mount a fresh one from the flags.
pub fn open_shell(db: &Database) -> Result<Shell<'_>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let shell = match load_navigator(db) {
        Some(nav) => ViewOrchestrator::restore(nav, db, db, config),
        None => ViewOrchestrator::mount(db, db, config),
    };
    Ok(shell)
}

/// Everything a front end needs to draw the current screen.
#[derive(Serialize)]
pub struct Status<'a> {
    pub view: ViewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<MainTab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<TooltipFocus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<&'a DemoState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<TrialProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<&'a Question>,
    pub counters: Counters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panels: Option<HomePanels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_proof: Option<SocialProofStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey: Option<JourneyProgress>,
}

pub fn status<'a>(shell: &'a Shell<'_>) -> Status<'a> {
    let next_question = shell
        .trial_session()
        .and_then(|s| match s.next_question() {
            barprep_core::trial::TrialServe::Serve(q) => Some(q),
            _ => None,
        });
    let panels = shell.home_panels();
    Status {
        view: shell.current_view(),
        tab: shell.current_tab(),
        overlay: shell.overlay(),
        tour_step: shell.tour_position().map(|t| t.index()),
        tour_progress: shell.tour_position().map(|t| t.progress_pct()),
        demo: shell.demo(),
        trial: shell.trial_progress(),
        next_question,
        counters: shell.counters(),
        panels,
        social_proof: shell.social_proof(),
        journey: panels
            .filter(|p| p.journey)
            .map(|_| shell.engagement().journey_progress()),
    }
}

#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    status: Status<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    events: Vec<Event>,
}

/// Print status, `result` and pending events, then persist the navigator.
pub fn finish<T: Serialize>(db: &Database, mut shell: Shell<'_>, result: Option<T>) -> CmdResult {
    let events = shell.drain_events();
    let report = Report {
        status: status(&shell),
        result,
        events,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    drop(report);

    let json = serde_json::to_string(&shell.into_navigator())?;
    db.kv_set(NAVIGATOR_KEY, &json)?;
    Ok(())
}
