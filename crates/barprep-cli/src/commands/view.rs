use barprep_core::{Database, WelcomeChoice};
use clap::Subcommand;

use super::{finish, open_shell, CmdResult};

#[derive(Subcommand)]
pub enum ViewAction {
    /// Print the current view as JSON
    Status,
    /// Pick an option on the welcome screen
    Choose {
        /// try-demo, guided-tour, skip or explore-free
        choice: WelcomeChoice,
    },
    /// Leave the returning-visitor welcome
    Continue,
}

pub fn run(action: ViewAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;

    match action {
        ViewAction::Status => {
            shell.refresh_counters(&db, user);
        }
        ViewAction::Choose { choice } => {
            shell.choose(choice)?;
        }
        ViewAction::Continue => {
            shell.continue_from_returning()?;
        }
    }
    finish(&db, shell, None::<()>)
}
