//! Rationed free trial.
//!
//! A session draws up to `limit` questions at random from a pool, counts the
//! ones the visitor finishes, and locks for good once the count reaches the
//! limit. A locked session serves nothing further; the only ways out are
//! upgrade or exit, both handled by the orchestrator.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::TrialError;
use crate::question::{Question, QuestionId};

/// Default free question quota.
pub const FREE_LIMIT: usize = 3;

/// Session factory.
#[derive(Debug, Clone)]
pub struct TrialGate {
    limit: usize,
    seed: Option<u64>,
}

impl TrialGate {
    /// `limit` is raised to 1 if zero.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            seed: None,
        }
    }

    /// Reproducible sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Draw a uniform sample without replacement.
    ///
    /// A pool smaller than the limit is taken whole (shuffled); an empty pool
    /// gives an empty, unlocked session.
    pub fn start(&self, mut pool: Vec<Question>) -> TrialSession {
        let mut rng = match self.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        pool.shuffle(&mut rng);
        pool.truncate(self.limit);

        tracing::debug!(sampled = pool.len(), limit = self.limit, "trial session started");
        TrialSession {
            sampled: pool,
            consumed: 0,
            correct: 0,
            limit: self.limit,
            locked: false,
        }
    }
}

impl Default for TrialGate {
    fn default() -> Self {
        Self::new(FREE_LIMIT)
    }
}

/// What the session can serve next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialServe<'a> {
    Serve(&'a Question),
    /// Nothing left to serve but the quota was not reached.
    Exhausted,
    /// Quota reached; show the paywall.
    Locked,
}

/// Counts reported after each recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialProgress {
    pub locked: bool,
    pub consumed_count: usize,
    pub correct_count: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSession {
    sampled: Vec<Question>,
    consumed: usize,
    correct: usize,
    limit: usize,
    locked: bool,
}

impl TrialSession {
    pub fn sampled(&self) -> &[Question] {
        &self.sampled
    }

    pub fn sampled_ids(&self) -> Vec<QuestionId> {
        self.sampled.iter().map(|q| q.id.clone()).collect()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Questions still servable before the session either locks or runs dry.
    pub fn remaining(&self) -> usize {
        if self.locked {
            0
        } else {
            self.sampled.len().saturating_sub(self.consumed)
        }
    }

    pub fn next_question(&self) -> TrialServe<'_> {
        if self.locked {
            return TrialServe::Locked;
        }
        match self.sampled.get(self.consumed) {
            Some(q) => TrialServe::Serve(q),
            None => TrialServe::Exhausted,
        }
    }

    /// Count one finished question.
    pub fn record_answer(&mut self, was_correct: bool) -> Result<TrialProgress, TrialError> {
        if self.locked {
            return Err(TrialError::Locked { limit: self.limit });
        }
        if self.consumed >= self.sampled.len() {
            return Err(TrialError::Exhausted {
                consumed: self.consumed,
            });
        }

        self.consumed += 1;
        if was_correct {
            self.correct += 1;
        }
        if self.consumed == self.limit {
            self.locked = true;
            tracing::debug!(consumed = self.consumed, correct = self.correct, "trial locked");
        }
        Ok(self.progress())
    }

    pub fn progress(&self) -> TrialProgress {
        TrialProgress {
            locked: self.locked,
            consumed_count: self.consumed,
            correct_count: self.correct,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::sample_question;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| sample_question(&format!("q{i}"), "Direito Civil"))
            .collect()
    }

    #[test]
    fn locks_after_limit_and_rejects_fourth() {
        let mut session = TrialGate::new(3).with_seed(7).start(pool(6));
        assert_eq!(session.sampled().len(), 3);

        assert!(!session.record_answer(true).unwrap().locked);
        assert!(!session.record_answer(false).unwrap().locked);
        let last = session.record_answer(true).unwrap();
        assert!(last.locked);
        assert_eq!(last.consumed_count, 3);
        assert_eq!(last.correct_count, 2);

        assert_eq!(
            session.record_answer(true),
            Err(TrialError::Locked { limit: 3 })
        );
        assert_eq!(session.progress().consumed_count, 3);
        assert_eq!(session.next_question(), TrialServe::Locked);
    }

    #[test]
    fn small_pool_is_not_padded() {
        let mut session = TrialGate::new(3).with_seed(1).start(pool(2));
        let ids: HashSet<_> = session.sampled_ids().into_iter().collect();
        assert_eq!(ids.len(), 2);

        session.record_answer(true).unwrap();
        session.record_answer(true).unwrap();
        assert!(!session.is_locked());
        assert_eq!(session.next_question(), TrialServe::Exhausted);
        assert_eq!(
            session.record_answer(false),
            Err(TrialError::Exhausted { consumed: 2 })
        );
    }

    #[test]
    fn empty_pool_gives_empty_unlocked_session() {
        let session = TrialGate::default().start(Vec::new());
        assert!(session.sampled().is_empty());
        assert!(!session.is_locked());
        assert_eq!(session.next_question(), TrialServe::Exhausted);
    }

    #[test]
    fn sample_has_no_duplicates() {
        let session = TrialGate::new(5).start(pool(20));
        let ids: HashSet<_> = session.sampled_ids().into_iter().collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let a = TrialGate::new(3).with_seed(42).start(pool(10));
        let b = TrialGate::new(3).with_seed(42).start(pool(10));
        assert_eq!(a.sampled_ids(), b.sampled_ids());
    }

    #[test]
    fn serves_in_sample_order() {
        let mut session = TrialGate::new(3).with_seed(3).start(pool(5));
        let ids = session.sampled_ids();
        match session.next_question() {
            TrialServe::Serve(q) => assert_eq!(q.id, ids[0]),
            other => panic!("expected a question, got {other:?}"),
        }
        session.record_answer(false).unwrap();
        match session.next_question() {
            TrialServe::Serve(q) => assert_eq!(q.id, ids[1]),
            other => panic!("expected a question, got {other:?}"),
        }
    }
}
