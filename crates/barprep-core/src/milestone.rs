//! One-way milestone bookkeeping shared by the achievement and journey engines.

use serde::{Deserialize, Serialize};

use crate::counters::{Counters, Metric};

/// Condition a milestone waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// The visitor has a profile.
    Profile,
    /// `counters[metric] >= threshold`.
    Reach { metric: Metric, threshold: u64 },
}

impl Requirement {
    pub fn reach(metric: Metric, threshold: u64) -> Self {
        Requirement::Reach { metric, threshold }
    }

    pub fn is_met(&self, counters: &Counters) -> bool {
        match *self {
            Requirement::Profile => counters.has_profile,
            Requirement::Reach { metric, threshold } => counters.value(metric) >= threshold,
        }
    }
}

/// Completed milestone ids, in the order they were crossed, and the points
/// they earned.
///
/// Ids are only ever added. `total_points` is the sum of the points recorded
/// with each id, counted once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneLedger {
    completed: Vec<String>,
    total_points: u32,
}

impl MilestoneLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|c| c == id)
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Record a crossing. Returns `false` if the id was already completed.
    pub fn record(&mut self, id: &str, points: u32) -> bool {
        if self.is_completed(id) {
            return false;
        }
        self.completed.push(id.to_string());
        self.total_points = self.total_points.saturating_add(points);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_points_once() {
        let mut ledger = MilestoneLedger::new();
        assert!(ledger.record("a", 10));
        assert!(!ledger.record("a", 10));
        assert!(ledger.record("b", 5));
        assert_eq!(ledger.total_points(), 15);
        assert_eq!(ledger.completed(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn requirement_profile_and_reach() {
        let c = Counters::new(3, 1, false);
        assert!(!Requirement::Profile.is_met(&c));
        assert!(Requirement::reach(Metric::Questions, 3).is_met(&c));
        assert!(!Requirement::reach(Metric::Correct, 3).is_met(&c));
    }
}
