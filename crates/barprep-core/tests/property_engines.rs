use barprep_core::achievements::AchievementEngine;
use barprep_core::journey::JourneyEngine;
use barprep_core::{Counters, MilestoneLedger, TrialGate};
use proptest::prelude::*;
use std::collections::HashSet;

/// Non-decreasing counter snapshots built from per-step increments.
fn growing_counters() -> impl Strategy<Value = Vec<Counters>> {
    prop::collection::vec((0u64..4, 0u64..4, any::<bool>()), 1..12).prop_map(|steps| {
        let mut answered = 0;
        let mut correct = 0;
        let mut profile = false;
        steps
            .into_iter()
            .map(|(more, hits, gets_profile)| {
                answered += more;
                correct = (correct + hits).min(answered);
                profile |= gets_profile;
                Counters::new(answered, correct, profile)
            })
            .collect()
    })
}

proptest! {
    /// Property: completed sets never shrink
    #[test]
    fn prop_completion_is_monotonic(snapshots in growing_counters()) {
        let achievements = AchievementEngine::new();
        let journey = JourneyEngine::new();
        let mut a_ledger = MilestoneLedger::new();
        let mut j_ledger = MilestoneLedger::new();

        for counters in &snapshots {
            let a = achievements.evaluate(counters, &a_ledger);
            let j = journey.evaluate(counters, &j_ledger);
            for id in a_ledger.completed() {
                prop_assert!(a.ledger.is_completed(id));
            }
            for id in j_ledger.completed() {
                prop_assert!(j.ledger.is_completed(id));
            }
            a_ledger = a.ledger;
            j_ledger = j.ledger;
        }
    }

    /// Property: an id is fired at most once, even when snapshots go backwards
    #[test]
    fn prop_fire_once(
        snapshots in prop::collection::vec((0u64..8, 0u64..8, any::<bool>()), 1..20)
    ) {
        let engine = AchievementEngine::new();
        let journey = JourneyEngine::new();
        let mut ledger = MilestoneLedger::new();
        let mut j_ledger = MilestoneLedger::new();
        let mut fired = HashSet::new();
        let mut completions = 0;

        for (answered, correct, profile) in snapshots {
            let counters = Counters::new(answered, correct, profile);
            let eval = engine.evaluate(&counters, &ledger);
            for id in &eval.fired {
                prop_assert!(fired.insert(id.clone()), "{} fired twice", id);
            }
            ledger = eval.ledger;

            let j = journey.evaluate(&counters, &j_ledger);
            for id in &j.completed {
                prop_assert!(fired.insert(id.clone()), "{} completed twice", id);
            }
            if j.journey_complete.is_some() {
                completions += 1;
            }
            j_ledger = j.ledger;
        }
        prop_assert!(completions <= 1);
    }

    /// Property: total points equal the points of exactly the completed ids
    #[test]
    fn prop_points_conservation(snapshots in growing_counters()) {
        let engine = AchievementEngine::new();
        let journey = JourneyEngine::new();
        let mut ledger = MilestoneLedger::new();
        let mut j_ledger = MilestoneLedger::new();

        for counters in &snapshots {
            ledger = engine.evaluate(counters, &ledger).ledger;
            j_ledger = journey.evaluate(counters, &j_ledger).ledger;
        }

        let expected: u32 = ledger
            .completed()
            .iter()
            .filter_map(|id| engine.get(id))
            .map(|d| d.points)
            .sum();
        prop_assert_eq!(ledger.total_points(), expected);

        let expected: u32 = j_ledger
            .completed()
            .iter()
            .filter_map(|id| journey.get(id))
            .map(|s| s.points)
            .sum();
        prop_assert_eq!(j_ledger.total_points(), expected);
    }

    /// Property: the trial never serves more than its limit and locks exactly at it
    #[test]
    fn prop_trial_cap(limit in 1usize..6, pool_size in 0usize..10, seed in any::<u64>()) {
        let pool = (0..pool_size)
            .map(|i| barprep_core::Question {
                id: format!("q{i}"),
                area: "Direito Civil".into(),
                exam: "XL".into(),
                year: 2024,
                number: i as u32,
                statement: String::new(),
                options: vec!["a".into(), "b".into()],
                correct_option: "A".into(),
            })
            .collect();
        let mut session = TrialGate::new(limit).with_seed(seed).start(pool);

        let sampled = session.sampled_ids();
        prop_assert_eq!(sampled.len(), limit.min(pool_size));
        prop_assert_eq!(sampled.iter().collect::<HashSet<_>>().len(), sampled.len());

        let mut accepted = 0;
        for _ in 0..limit + 2 {
            if session.record_answer(true).is_ok() {
                accepted += 1;
            }
        }
        prop_assert_eq!(accepted, limit.min(pool_size));
        prop_assert_eq!(session.is_locked(), pool_size >= limit);
    }
}
