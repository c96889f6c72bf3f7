//! Guided study journey: a short ordered checklist with points.
//!
//! Same one-way rules as the achievements. On top of that the journey has a
//! terminal "complete" moment, reported only by the evaluation that fills the
//! last step.

use serde::{Deserialize, Serialize};

use crate::counters::{Counters, Metric};
use crate::milestone::{MilestoneLedger, Requirement};
use crate::orchestrator::MainTab;

/// Catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyStepDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requirement: Requirement,
    pub points: u32,
    /// Section the step's call-to-action navigates to.
    pub action: String,
    pub action_label: String,
}

impl JourneyStepDef {
    /// Tab the call-to-action lands on.
    pub fn tab(&self) -> MainTab {
        MainTab::for_section(&self.action)
    }
}

/// Catalog entry joined with its completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyStep {
    #[serde(flatten)]
    pub def: JourneyStepDef,
    pub completed: bool,
}

/// Output of [`JourneyEngine::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyEvaluation {
    pub ledger: MilestoneLedger,
    /// Steps completed by this evaluation, catalog order.
    pub completed: Vec<String>,
    pub points_delta: u32,
    /// `Some(total_points)` only when this evaluation completed the journey.
    pub journey_complete: Option<u32>,
}

/// Read-only progress summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyProgress {
    pub completed_count: usize,
    pub total_steps: usize,
    pub progress_percentage: f64,
    pub total_points: u32,
    pub next_step: Option<String>,
    pub is_complete: bool,
}

#[derive(Debug, Clone)]
pub struct JourneyEngine {
    steps: Vec<JourneyStepDef>,
}

impl JourneyEngine {
    pub fn new() -> Self {
        Self {
            steps: Self::default_steps(),
        }
    }

    fn default_steps() -> Vec<JourneyStepDef> {
        let step = |id: &str,
                    title: &str,
                    description: &str,
                    requirement: Requirement,
                    points: u32,
                    action: &str,
                    action_label: &str| JourneyStepDef {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            requirement,
            points,
            action: action.to_string(),
            action_label: action_label.to_string(),
        };
        vec![
            step(
                "complete_profile",
                "Complete your profile",
                "Add your details for a personalised experience",
                Requirement::Profile,
                50,
                "profile",
                "Go to profile",
            ),
            step(
                "first_question",
                "Answer your first question",
                "Try out the commented-question method",
                Requirement::reach(Metric::Questions, 1),
                25,
                "questions",
                "Start questions",
            ),
            step(
                "try_different_areas",
                "Explore different areas",
                "Test yourself across several subjects",
                Requirement::reach(Metric::Questions, 3),
                75,
                "areas",
                "See areas",
            ),
            step(
                "complete_study_session",
                "Complete a study session",
                "Answer at least 5 questions in a row",
                Requirement::reach(Metric::Questions, 5),
                100,
                "study",
                "Start session",
            ),
        ]
    }

    pub fn steps(&self) -> &[JourneyStepDef] {
        &self.steps
    }

    pub fn get(&self, id: &str) -> Option<&JourneyStepDef> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn evaluate(&self, counters: &Counters, prior: &MilestoneLedger) -> JourneyEvaluation {
        let was_complete = self.is_complete(prior);
        let mut ledger = prior.clone();
        let mut completed = Vec::new();
        let mut points_delta = 0;

        for step in &self.steps {
            if step.requirement.is_met(counters) && ledger.record(&step.id, step.points) {
                points_delta += step.points;
                completed.push(step.id.clone());
            }
        }

        let journey_complete = if !was_complete && self.is_complete(&ledger) {
            Some(ledger.total_points())
        } else {
            None
        };

        JourneyEvaluation {
            ledger,
            completed,
            points_delta,
            journey_complete,
        }
    }

    pub fn completed_count(&self, ledger: &MilestoneLedger) -> usize {
        self.steps
            .iter()
            .filter(|s| ledger.is_completed(&s.id))
            .count()
    }

    pub fn next_incomplete(&self, ledger: &MilestoneLedger) -> Option<&JourneyStepDef> {
        self.steps.iter().find(|s| !ledger.is_completed(&s.id))
    }

    pub fn progress_percentage(&self, ledger: &MilestoneLedger) -> f64 {
        if self.steps.is_empty() {
            return 100.0;
        }
        self.completed_count(ledger) as f64 / self.steps.len() as f64 * 100.0
    }

    pub fn is_complete(&self, ledger: &MilestoneLedger) -> bool {
        self.completed_count(ledger) == self.steps.len()
    }

    pub fn progress(&self, ledger: &MilestoneLedger) -> JourneyProgress {
        JourneyProgress {
            completed_count: self.completed_count(ledger),
            total_steps: self.steps.len(),
            progress_percentage: self.progress_percentage(ledger),
            total_points: ledger.total_points(),
            next_step: self.next_incomplete(ledger).map(|s| s.id.clone()),
            is_complete: self.is_complete(ledger),
        }
    }

    pub fn journey(&self, ledger: &MilestoneLedger) -> Vec<JourneyStep> {
        self.steps
            .iter()
            .map(|def| JourneyStep {
                def: def.clone(),
                completed: ledger.is_completed(&def.id),
            })
            .collect()
    }
}

impl Default for JourneyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_step_needs_profile() {
        let engine = JourneyEngine::new();
        let eval = engine.evaluate(&Counters::new(0, 0, true), &MilestoneLedger::new());
        assert_eq!(eval.completed, vec!["complete_profile".to_string()]);
        assert_eq!(eval.points_delta, 50);
        assert!(eval.journey_complete.is_none());
    }

    #[test]
    fn thresholds_one_three_five() {
        let engine = JourneyEngine::new();
        let e1 = engine.evaluate(&Counters::new(1, 0, false), &MilestoneLedger::new());
        assert_eq!(e1.completed, vec!["first_question".to_string()]);
        let e3 = engine.evaluate(&Counters::new(3, 0, false), &e1.ledger);
        assert_eq!(e3.completed, vec!["try_different_areas".to_string()]);
        let e5 = engine.evaluate(&Counters::new(5, 0, false), &e3.ledger);
        assert_eq!(e5.completed, vec!["complete_study_session".to_string()]);
        assert_eq!(e5.ledger.total_points(), 200);
    }

    #[test]
    fn journey_complete_reported_once() {
        let engine = JourneyEngine::new();
        let full = Counters::new(5, 2, true);
        let first = engine.evaluate(&full, &MilestoneLedger::new());
        assert_eq!(first.journey_complete, Some(250));
        assert_eq!(first.points_delta, 250);

        let again = engine.evaluate(&full, &first.ledger);
        assert_eq!(again.journey_complete, None);
        assert_eq!(again.points_delta, 0);
    }

    #[test]
    fn losing_profile_does_not_revert() {
        let engine = JourneyEngine::new();
        let with = engine.evaluate(&Counters::new(0, 0, true), &MilestoneLedger::new());
        let without = engine.evaluate(&Counters::new(0, 0, false), &with.ledger);
        assert!(without.ledger.is_completed("complete_profile"));
        assert_eq!(without.ledger.total_points(), 50);
    }

    #[test]
    fn progress_views() {
        let engine = JourneyEngine::new();
        let eval = engine.evaluate(&Counters::new(1, 0, false), &MilestoneLedger::new());
        let progress = engine.progress(&eval.ledger);
        assert_eq!(progress.completed_count, 1);
        assert_eq!(progress.progress_percentage, 25.0);
        assert_eq!(progress.next_step.as_deref(), Some("complete_profile"));
        assert!(!progress.is_complete);
    }

    #[test]
    fn step_actions_map_to_tabs() {
        let engine = JourneyEngine::new();
        let tabs: Vec<_> = engine.steps().iter().map(|s| s.tab()).collect();
        assert_eq!(
            tabs,
            vec![MainTab::Profile, MainTab::Areas, MainTab::Areas, MainTab::Areas]
        );
    }
}
