use barprep_core::Database;
use clap::Subcommand;

use super::{finish, open_shell, CmdResult};

#[derive(Subcommand)]
pub enum DemoAction {
    /// Answer the demo question with an option letter
    Answer {
        /// Option letter (A, B, ...)
        option: String,
    },
    /// Continue into the app after answering
    Finish,
    /// Skip the demo
    Skip,
}

pub fn run(action: DemoAction) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;

    match action {
        DemoAction::Answer { option } => {
            let answer = shell.submit_demo_answer(&option)?;
            return finish(&db, shell, Some(answer));
        }
        DemoAction::Finish => {
            shell.finish_demo()?;
        }
        DemoAction::Skip => {
            shell.skip_demo()?;
        }
    }
    finish(&db, shell, None::<()>)
}
