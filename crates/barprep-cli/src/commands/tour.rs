use barprep_core::walkthrough::tour_steps;
use barprep_core::Database;
use clap::Subcommand;

use super::{finish, open_shell, CmdResult};

#[derive(Subcommand)]
pub enum TourAction {
    /// Show the current tour step
    Show,
    /// Next step (finishing on the last one)
    Next,
    /// Previous step
    Back,
    /// Leave the tour
    Skip,
}

pub fn run(action: TourAction) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;

    match action {
        TourAction::Show => {}
        TourAction::Next => {
            shell.tour_next()?;
        }
        TourAction::Back => {
            shell.tour_back()?;
        }
        TourAction::Skip => {
            shell.tour_skip()?;
        }
    }

    let step = shell
        .tour_position()
        .and_then(|pos| tour_steps().into_iter().nth(pos.index()));
    finish(&db, shell, step)
}
