//! Visitor counters and the refresh bookkeeping around them.
//!
//! Counters come from an external aggregation (study sessions summed per
//! account). The core never computes them; it only keeps the latest snapshot
//! and decides which refresh result is allowed to replace it.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Snapshot of a visitor's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub questions_answered: u64,
    pub correct_answers: u64,
    pub has_profile: bool,
}

impl Counters {
    /// Build a snapshot; `correct` is clamped to `answered`.
    pub fn new(answered: u64, correct: u64, has_profile: bool) -> Self {
        Self {
            questions_answered: answered,
            correct_answers: correct.min(answered),
            has_profile,
        }
    }

    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Questions => self.questions_answered,
            Metric::Correct => self.correct_answers,
        }
    }
}

/// Which counter a threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Questions,
    Correct,
}

/// Provider of counter snapshots.
pub trait CounterSource {
    /// `identity` is the signed-in account, `None` for anonymous visitors.
    fn fetch_counters(&self, identity: Option<&str>) -> Result<Counters>;
}

impl<T: CounterSource + ?Sized> CounterSource for &T {
    fn fetch_counters(&self, identity: Option<&str>) -> Result<Counters> {
        (**self).fetch_counters(identity)
    }
}

/// Fixed counters, handy for shells without an aggregation backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCounters(pub Counters);

impl CounterSource for StaticCounters {
    fn fetch_counters(&self, _identity: Option<&str>) -> Result<Counters> {
        Ok(self.0)
    }
}

/// Handle for one in-flight refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Last known counters plus refresh ordering.
///
/// Tickets are issued in increasing order. A response is applied only if its
/// ticket is newer than the last applied one; older responses that resolve
/// late are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterCache {
    current: Counters,
    #[serde(default)]
    issued: u64,
    #[serde(default)]
    applied: u64,
}

impl CounterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Counters {
        self.current
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Returns the new snapshot when it was applied.
    ///
    /// Failures keep the previous snapshot (zero on first load).
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        outcome: Result<Counters>,
    ) -> Option<Counters> {
        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding superseded counter refresh"
            );
            return None;
        }
        match outcome {
            Ok(counters) => {
                self.applied = ticket.0;
                self.current = Counters::new(
                    counters.questions_answered,
                    counters.correct_answers,
                    counters.has_profile,
                );
                Some(self.current)
            }
            Err(e) => {
                tracing::warn!(error = %e, "counter refresh failed, keeping last snapshot");
                None
            }
        }
    }
}
