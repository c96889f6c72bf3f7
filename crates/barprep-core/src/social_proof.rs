//! Social-proof banner numbers and their cosmetic drift.
//!
//! The drift is wall-clock based with no internal thread; the owner calls
//! `tick(now)`. Dropping the ticker is the teardown: nothing keeps running
//! once the banner is gone.

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

/// Upper bound on drift steps applied by a single tick.
const MAX_CATCH_UP_STEPS: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProofStats {
    pub active_users: u64,
    pub questions_answered: u64,
    pub success_rate: u8,
    pub approved_students: u64,
}

impl Default for SocialProofStats {
    fn default() -> Self {
        Self {
            active_users: 1247,
            questions_answered: 15643,
            success_rate: 87,
            approved_students: 234,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SocialProofTicker {
    stats: SocialProofStats,
    interval: Duration,
    last_step: DateTime<Utc>,
    rng: Mcg128Xsl64,
}

impl SocialProofTicker {
    /// `interval` below one second is raised to one second.
    pub fn new(now: DateTime<Utc>, interval: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            stats: SocialProofStats::default(),
            interval: interval.max(Duration::seconds(1)),
            last_step: now,
            rng,
        }
    }

    pub fn stats(&self) -> SocialProofStats {
        self.stats
    }

    /// Apply one drift step per elapsed interval. Returns the new numbers
    /// when at least one step happened.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SocialProofStats> {
        let elapsed = now - self.last_step;
        if elapsed < self.interval {
            return None;
        }
        let interval_ms = self.interval.num_milliseconds().max(1);
        let steps = elapsed.num_milliseconds() / interval_ms;
        for _ in 0..steps.min(MAX_CATCH_UP_STEPS) {
            self.stats.active_users += self.rng.gen_range(0..3);
            self.stats.questions_answered += self.rng.gen_range(0..5);
        }
        self.last_step = self.last_step + Duration::milliseconds(steps * interval_ms);
        Some(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_drift_before_interval() {
        let t0 = Utc::now();
        let mut ticker = SocialProofTicker::new(t0, Duration::seconds(30), Some(1));
        assert!(ticker.tick(t0 + Duration::seconds(29)).is_none());
        assert_eq!(ticker.stats(), SocialProofStats::default());
    }

    #[test]
    fn drift_is_monotonic_and_bounded() {
        let t0 = Utc::now();
        let mut ticker = SocialProofTicker::new(t0, Duration::seconds(30), Some(9));
        let before = ticker.stats();
        let after = ticker.tick(t0 + Duration::seconds(90)).unwrap();
        assert!(after.active_users >= before.active_users);
        assert!(after.active_users <= before.active_users + 3 * 2);
        assert!(after.questions_answered <= before.questions_answered + 3 * 4);
        assert_eq!(after.success_rate, before.success_rate);
        assert_eq!(after.approved_students, before.approved_students);
    }

    #[test]
    fn partial_interval_carries_over() {
        let t0 = Utc::now();
        let mut ticker = SocialProofTicker::new(t0, Duration::seconds(30), Some(2));
        assert!(ticker.tick(t0 + Duration::seconds(45)).is_some());
        assert!(ticker.tick(t0 + Duration::seconds(59)).is_none());
        assert!(ticker.tick(t0 + Duration::seconds(60)).is_some());
    }
}
