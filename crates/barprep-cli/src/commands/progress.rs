use barprep_core::journey::JourneyStep;
use barprep_core::{Achievement, Database, JourneyProgress};
use serde::Serialize;

use super::{finish, open_shell, CmdResult};

#[derive(Serialize)]
struct Progress {
    achievements: Vec<Achievement>,
    achievement_points: u32,
    journey: Vec<JourneyStep>,
    journey_progress: JourneyProgress,
}

pub fn run(user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;
    shell.refresh_counters(&db, user);

    let engagement = shell.engagement();
    let progress = Progress {
        achievements: engagement.achievements(),
        achievement_points: engagement.achievement_ledger().total_points(),
        journey: engagement.journey(),
        journey_progress: engagement.journey_progress(),
    };
    finish(&db, shell, Some(progress))
}
