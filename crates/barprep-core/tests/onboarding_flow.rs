//! End-to-end onboarding scenarios over in-memory collaborators.

use barprep_core::achievements::AchievementEngine;
use barprep_core::journey::JourneyEngine;
use barprep_core::{
    Config, Counters, CoreError, EngagementListener, Event, FlagKey, MemoryFlags,
    MilestoneLedger, Question, QuestionBank, TransitionError, TrialError, TrialGate, ViewKind,
    ViewOrchestrator, WelcomeChoice,
};

fn question(id: &str, area: &str) -> Question {
    Question {
        id: id.to_string(),
        area: area.to_string(),
        exam: "XXXIX".to_string(),
        year: 2024,
        number: 12,
        statement: format!("Statement {id}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_option: "C".to_string(),
    }
}

fn bank() -> QuestionBank {
    QuestionBank::new(vec![
        question("q1", "Direito Constitucional"),
        question("q2", "Direito Civil"),
        question("q3", "Direito Penal"),
        question("q4", "Direito Civil"),
        question("q5", "Direito Empresarial"),
    ])
}

fn config() -> Config {
    let mut config = Config::default();
    config.trial.seed = Some(42);
    config
}

#[derive(Default)]
struct Log {
    views: Vec<(ViewKind, ViewKind)>,
    achievements: Vec<String>,
    journey_steps: Vec<String>,
    journey_total: Option<u32>,
}

impl EngagementListener for Log {
    fn on_view_changed(&mut self, from: ViewKind, to: ViewKind) {
        self.views.push((from, to));
    }

    fn on_achievement_fired(&mut self, id: &str) {
        self.achievements.push(id.to_string());
    }

    fn on_journey_step_completed(&mut self, id: &str) {
        self.journey_steps.push(id.to_string());
    }

    fn on_journey_complete(&mut self, total_points: u32) {
        self.journey_total = Some(total_points);
    }
}

#[test]
fn fresh_visitor_skips_into_main_app_with_tooltips() {
    let flags = MemoryFlags::new();
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    assert_eq!(shell.current_view(), ViewKind::WelcomeNew);

    shell.choose(WelcomeChoice::Skip).unwrap();
    assert!(flags.is_set(FlagKey::OnboardingCompleted));
    assert_eq!(shell.current_view(), ViewKind::MainApp);
    assert_eq!(shell.overlay().map(|f| f.step_index), Some(0));

    // Next visit: tooltips still unseen.
    drop(shell);
    let shell = ViewOrchestrator::mount(&flags, bank(), config());
    assert_eq!(shell.current_view(), ViewKind::MainApp);
    assert!(shell.overlay().is_some());
}

#[test]
fn single_answer_fires_threshold_one_achievements_only() {
    let engine = AchievementEngine::new();
    let ledger = MilestoneLedger::new();

    let none = engine.evaluate(&Counters::new(0, 0, false), &ledger);
    assert!(none.fired.is_empty());

    let one = engine.evaluate(&Counters::new(1, 0, false), &none.ledger);
    assert_eq!(one.fired, vec!["first_try"]);
}

#[test]
fn jump_to_five_fires_everything_in_one_batch() {
    let engine = JourneyEngine::new();
    let eval = engine.evaluate(&Counters::new(5, 0, false), &MilestoneLedger::new());
    assert_eq!(
        eval.completed,
        vec!["first_question", "try_different_areas", "complete_study_session"]
    );
    assert_eq!(eval.points_delta, 200);
    assert_eq!(eval.journey_complete, None);

    let achievements = AchievementEngine::new()
        .evaluate(&Counters::new(5, 0, false), &MilestoneLedger::new());
    assert_eq!(achievements.fired, vec!["first_try", "early_achiever"]);
}

#[test]
fn small_pool_runs_dry_without_locking() {
    let mut session = TrialGate::new(3)
        .with_seed(1)
        .start(vec![question("a", "Direito Civil"), question("b", "Direito Civil")]);
    let mut ids = session.sampled_ids();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);

    session.record_answer(true).unwrap();
    let progress = session.record_answer(false).unwrap();
    assert!(!progress.locked);
    assert_eq!(progress.consumed_count, 2);
    assert_eq!(
        session.record_answer(true),
        Err(TrialError::Exhausted { consumed: 2 })
    );
}

#[test]
fn fourth_trial_answer_is_rejected() {
    let flags = MemoryFlags::new();
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    shell.choose(WelcomeChoice::ExploreFree).unwrap();

    for expected in 1..=3 {
        let progress = shell.record_trial_answer(expected % 2 == 0).unwrap();
        assert_eq!(progress.consumed_count, expected);
    }
    assert!(shell.trial_progress().unwrap().locked);
    assert!(matches!(
        shell.record_trial_answer(true),
        Err(TransitionError::Trial(TrialError::Locked { limit: 3 }))
    ));
    assert_eq!(shell.trial_progress().unwrap().consumed_count, 3);
    assert_eq!(shell.current_view(), ViewKind::FreeExploration);
}

#[test]
fn trial_samples_only_configured_areas() {
    let mut shell = ViewOrchestrator::mount(MemoryFlags::new(), bank(), config());
    shell.choose(WelcomeChoice::ExploreFree).unwrap();
    let session = shell.trial_session().unwrap();
    assert_eq!(session.sampled().len(), 3);
    assert!(session
        .sampled()
        .iter()
        .all(|q| q.area != "Direito Empresarial"));
}

#[test]
fn exactly_one_view_across_a_full_journey() {
    let flags = MemoryFlags::new();
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    let mut seen = vec![shell.current_view()];

    shell.choose(WelcomeChoice::ExploreFree).unwrap();
    seen.push(shell.current_view());
    shell.exit_trial().unwrap();
    seen.push(shell.current_view());
    shell.choose(WelcomeChoice::GuidedTour).unwrap();
    seen.push(shell.current_view());
    shell.tour_skip().unwrap();
    seen.push(shell.current_view());

    assert_eq!(
        seen,
        vec![
            ViewKind::WelcomeNew,
            ViewKind::FreeExploration,
            ViewKind::WelcomeNew,
            ViewKind::OnboardingTour,
            ViewKind::MainApp,
        ]
    );

    let mut log = Log::default();
    shell.dispatch_events(&mut log);
    assert_eq!(log.views.len(), 4);
    assert_eq!(log.views.last(), Some(&(ViewKind::OnboardingTour, ViewKind::MainApp)));
}

#[test]
fn listener_sees_each_milestone_once() {
    let flags = MemoryFlags::with(&[FlagKey::OnboardingCompleted, FlagKey::TooltipsSeen]);
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    let mut log = Log::default();

    for counters in [
        Counters::new(0, 0, true),
        Counters::new(1, 1, true),
        Counters::new(1, 1, true),
        Counters::new(3, 2, true),
        Counters::new(5, 3, true),
        Counters::new(5, 3, true),
    ] {
        let ticket = shell.begin_counter_refresh();
        shell.apply_counter_refresh(ticket, Ok(counters));
        shell.dispatch_events(&mut log);
    }

    assert_eq!(
        log.achievements,
        vec!["first_try", "first_correct", "early_achiever", "confidence_builder"]
    );
    assert_eq!(
        log.journey_steps,
        vec![
            "complete_profile",
            "first_question",
            "try_different_areas",
            "complete_study_session"
        ]
    );
    assert_eq!(log.journey_total, Some(250));
}

#[test]
fn listener_skips_milestones_crossed_on_hidden_panel() {
    let flags = MemoryFlags::with(&[FlagKey::OnboardingCompleted, FlagKey::TooltipsSeen]);
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    let mut log = Log::default();

    for _ in 0..2 {
        let ticket = shell.begin_counter_refresh();
        shell.apply_counter_refresh(ticket, Ok(Counters::new(12, 12, true)));
        shell.dispatch_events(&mut log);
    }

    assert!(log.achievements.is_empty());
    assert_eq!(shell.engagement().achievement_ledger().len(), 4);
    assert_eq!(log.journey_steps.len(), 4);
    assert_eq!(log.journey_total, Some(250));
}

#[test]
fn stale_refresh_cannot_undo_progress() {
    let flags = MemoryFlags::with(&[FlagKey::OnboardingCompleted, FlagKey::TooltipsSeen]);
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());

    let slow = shell.begin_counter_refresh();
    let fast = shell.begin_counter_refresh();
    shell.apply_counter_refresh(fast, Ok(Counters::new(3, 1, false)));
    shell.apply_counter_refresh(slow, Ok(Counters::new(0, 0, false)));
    assert_eq!(shell.counters().questions_answered, 3);

    let failed = shell.begin_counter_refresh();
    shell.apply_counter_refresh(failed, Err(CoreError::source("stats", "timeout")));
    assert_eq!(shell.counters().questions_answered, 3);
    assert_eq!(shell.engagement().achievement_ledger().len(), 3);
}

#[test]
fn flag_write_failure_does_not_block_navigation() {
    let flags = MemoryFlags::failing_writes();
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    assert_eq!(shell.choose(WelcomeChoice::Skip).unwrap(), ViewKind::MainApp);

    // Nothing persisted, so the next visit starts over.
    let shell = ViewOrchestrator::mount(&flags, bank(), config());
    assert_eq!(shell.current_view(), ViewKind::WelcomeNew);
}

#[test]
fn upgrade_emits_event_and_keeps_onboarding_open() {
    let flags = MemoryFlags::new();
    let mut shell = ViewOrchestrator::mount(&flags, bank(), config());
    shell.choose(WelcomeChoice::ExploreFree).unwrap();
    assert!(shell.request_upgrade().is_err());
    for _ in 0..3 {
        shell.record_trial_answer(true).unwrap();
    }
    shell.drain_events();

    shell.request_upgrade().unwrap();
    let events = shell.drain_events();
    assert!(matches!(events.first(), Some(Event::UpgradeRequested { .. })));
    assert_eq!(shell.current_view(), ViewKind::MainApp);
    assert!(!flags.is_set(FlagKey::OnboardingCompleted));
}
