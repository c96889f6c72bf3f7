use barprep_core::trial::TrialServe;
use barprep_core::{Database, FixedChoice, TransitionError};
use clap::Subcommand;

use super::{finish, open_shell, CmdResult};

#[derive(Subcommand)]
pub enum TrialAction {
    /// Show trial progress and the next question
    Status,
    /// Answer the current trial question with an option letter
    Answer {
        /// Option letter (A, B, ...)
        option: String,
    },
    /// Back to the welcome screen
    Exit,
    /// Go to the upgrade flow (after the free quota is used)
    Upgrade,
}

pub fn run(action: TrialAction) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;

    match action {
        TrialAction::Status => {}
        TrialAction::Answer { option } => {
            if let Some(TrialServe::Serve(q)) = shell.trial_session().map(|s| s.next_question()) {
                if !q.has_option(&option) {
                    return Err(TransitionError::InvalidOption(option).into());
                }
            }
            let (answer, _) = shell.play_trial_question(&mut FixedChoice(option))?;
            return finish(&db, shell, Some(answer));
        }
        TrialAction::Exit => {
            shell.exit_trial()?;
        }
        TrialAction::Upgrade => {
            shell.request_upgrade()?;
        }
    }
    finish(&db, shell, None::<()>)
}
