//! Quick-win achievements.
//!
//! `evaluate` is pure: it takes the previous ledger and a counter snapshot and
//! returns the next ledger plus the ids that crossed their threshold in this
//! call, in catalog order. Ids already in the ledger are never returned again,
//! so a caller that celebrates every fired id celebrates each one exactly once.

use serde::{Deserialize, Serialize};

use crate::counters::{Counters, Metric};
use crate::milestone::{MilestoneLedger, Requirement};

/// How loudly the presentation layer should celebrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Celebration {
    /// Toast plus confetti.
    Confetti,
    /// Toast only.
    Toast,
}

/// Catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub metric: Metric,
    pub threshold: u64,
    pub points: u32,
    pub celebration: Celebration,
}

impl AchievementDef {
    fn requirement(&self) -> Requirement {
        Requirement::reach(self.metric, self.threshold)
    }
}

/// Catalog entry joined with its completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(flatten)]
    pub def: AchievementDef,
    pub completed: bool,
}

/// Output of [`AchievementEngine::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementEvaluation {
    pub ledger: MilestoneLedger,
    pub fired: Vec<String>,
    pub points_earned: u32,
}

#[derive(Debug, Clone)]
pub struct AchievementEngine {
    catalog: Vec<AchievementDef>,
}

impl AchievementEngine {
    /// Engine over the built-in catalog.
    pub fn new() -> Self {
        Self {
            catalog: Self::default_catalog(),
        }
    }

    /// Engine over a custom catalog. Zero thresholds are raised to 1.
    pub fn with_catalog(catalog: Vec<AchievementDef>) -> Self {
        let catalog = catalog
            .into_iter()
            .map(|mut def| {
                def.threshold = def.threshold.max(1);
                def
            })
            .collect();
        Self { catalog }
    }

    fn default_catalog() -> Vec<AchievementDef> {
        let entry = |id: &str,
                     title: &str,
                     description: &str,
                     metric: Metric,
                     threshold: u64,
                     points: u32,
                     celebration: Celebration| AchievementDef {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            metric,
            threshold,
            points,
            celebration,
        };
        vec![
            entry(
                "first_try",
                "First Step!",
                "Answer your first question",
                Metric::Questions,
                1,
                10,
                Celebration::Confetti,
            ),
            entry(
                "first_correct",
                "First Hit!",
                "Get your first question right",
                Metric::Correct,
                1,
                10,
                Celebration::Confetti,
            ),
            entry(
                "early_achiever",
                "Good Start!",
                "Answer 3 questions",
                Metric::Questions,
                3,
                25,
                Celebration::Toast,
            ),
            entry(
                "confidence_builder",
                "Building Confidence!",
                "Get 3 questions right",
                Metric::Correct,
                3,
                25,
                Celebration::Toast,
            ),
        ]
    }

    pub fn catalog(&self) -> &[AchievementDef] {
        &self.catalog
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDef> {
        self.catalog.iter().find(|d| d.id == id)
    }

    pub fn evaluate(&self, counters: &Counters, prior: &MilestoneLedger) -> AchievementEvaluation {
        let mut ledger = prior.clone();
        let mut fired = Vec::new();
        let mut points_earned = 0;

        for def in &self.catalog {
            if ledger.is_completed(&def.id) || !def.requirement().is_met(counters) {
                continue;
            }
            if ledger.record(&def.id, def.points) {
                points_earned += def.points;
                fired.push(def.id.clone());
            }
        }

        AchievementEvaluation {
            ledger,
            fired,
            points_earned,
        }
    }

    /// Full catalog with completion flags, in catalog order.
    pub fn achievements(&self, ledger: &MilestoneLedger) -> Vec<Achievement> {
        self.catalog
            .iter()
            .map(|def| Achievement {
                def: def.clone(),
                completed: ledger.is_completed(&def.id),
            })
            .collect()
    }

    /// First catalog entry not yet completed.
    pub fn next_pending(&self, ledger: &MilestoneLedger) -> Option<&AchievementDef> {
        self.catalog.iter().find(|d| !ledger.is_completed(&d.id))
    }

    /// The most recently completed entries, oldest first, at most `n`.
    pub fn recent(&self, ledger: &MilestoneLedger, n: usize) -> Vec<&AchievementDef> {
        let done = ledger.completed();
        let start = done.len().saturating_sub(n);
        done[start..].iter().filter_map(|id| self.get(id)).collect()
    }

    pub fn completed_count(&self, ledger: &MilestoneLedger) -> usize {
        self.catalog
            .iter()
            .filter(|d| ledger.is_completed(&d.id))
            .count()
    }
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nothing_fires_at_zero() {
        let engine = AchievementEngine::new();
        let eval = engine.evaluate(&Counters::default(), &MilestoneLedger::new());
        assert!(eval.fired.is_empty());
        assert_eq!(eval.points_earned, 0);
    }

    #[test]
    fn first_question_fires_alone() {
        let engine = AchievementEngine::new();
        let eval = engine.evaluate(&Counters::new(1, 0, false), &MilestoneLedger::new());
        assert_eq!(eval.fired, ids(&["first_try"]));
    }

    #[test]
    fn unchanged_counters_fire_nothing_twice() {
        let engine = AchievementEngine::new();
        let counters = Counters::new(1, 1, false);
        let first = engine.evaluate(&counters, &MilestoneLedger::new());
        assert_eq!(first.fired, ids(&["first_try", "first_correct"]));

        let second = engine.evaluate(&counters, &first.ledger);
        assert!(second.fired.is_empty());
        assert_eq!(second.ledger, first.ledger);
    }

    #[test]
    fn jump_fires_batch_in_catalog_order() {
        let engine = AchievementEngine::new();
        let eval = engine.evaluate(&Counters::new(5, 3, false), &MilestoneLedger::new());
        assert_eq!(
            eval.fired,
            ids(&["first_try", "first_correct", "early_achiever", "confidence_builder"])
        );
        assert_eq!(eval.points_earned, 70);
        assert_eq!(eval.ledger.total_points(), 70);
    }

    #[test]
    fn lower_counters_never_revert_completion() {
        let engine = AchievementEngine::new();
        let high = engine.evaluate(&Counters::new(3, 3, false), &MilestoneLedger::new());
        let low = engine.evaluate(&Counters::new(0, 0, false), &high.ledger);
        assert!(low.fired.is_empty());
        assert_eq!(engine.completed_count(&low.ledger), 4);
    }

    #[test]
    fn first_achievements_get_confetti() {
        let engine = AchievementEngine::new();
        let confetti: Vec<_> = engine
            .catalog()
            .iter()
            .filter(|d| d.celebration == Celebration::Confetti)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(confetti, vec!["first_try", "first_correct"]);
    }

    #[test]
    fn next_pending_and_recent() {
        let engine = AchievementEngine::new();
        let eval = engine.evaluate(&Counters::new(3, 0, false), &MilestoneLedger::new());
        assert_eq!(engine.next_pending(&eval.ledger).unwrap().id, "first_correct");
        let recent: Vec<_> = engine
            .recent(&eval.ledger, 2)
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(recent, ids(&["first_try", "early_achiever"]));
    }

    #[test]
    fn custom_catalog_threshold_floor() {
        let engine = AchievementEngine::with_catalog(vec![AchievementDef {
            id: "zero".into(),
            title: "Zero".into(),
            description: String::new(),
            metric: Metric::Questions,
            threshold: 0,
            points: 1,
            celebration: Celebration::Toast,
        }]);
        let eval = engine.evaluate(&Counters::default(), &MilestoneLedger::new());
        assert!(eval.fired.is_empty());
    }
}
