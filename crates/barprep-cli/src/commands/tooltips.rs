use barprep_core::walkthrough::tooltip_steps;
use barprep_core::Database;
use clap::Subcommand;

use super::{finish, open_shell, CmdResult};

#[derive(Subcommand)]
pub enum TooltipsAction {
    /// Show the active tooltip
    Show,
    /// Next tooltip (dismissing after the last one)
    Next,
    /// Dismiss the overlay
    Skip,
}

pub fn run(action: TooltipsAction) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;

    match action {
        TooltipsAction::Show => {}
        TooltipsAction::Next => {
            shell.tooltip_next()?;
        }
        TooltipsAction::Skip => {
            shell.tooltip_skip()?;
        }
    }

    let step = shell
        .overlay()
        .and_then(|focus| tooltip_steps().into_iter().nth(focus.step_index));
    finish(&db, shell, step)
}
