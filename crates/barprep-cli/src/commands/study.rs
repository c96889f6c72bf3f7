use barprep_core::Database;
use chrono::Utc;
use clap::Subcommand;

use super::{finish, open_shell, CmdResult};

#[derive(Subcommand)]
pub enum StudyAction {
    /// Record a finished study session for the signed-in user
    Record {
        /// Questions answered in the session
        #[arg(long)]
        answered: u64,
        /// Questions answered correctly
        #[arg(long, default_value = "0")]
        correct: u64,
    },
    /// List recorded sessions for the signed-in user
    List,
}

pub fn run(action: StudyAction, user: Option<&str>) -> CmdResult {
    let user = user.ok_or("study sessions need --user (or BARPREP_USER)")?;
    let db = Database::open()?;

    match action {
        StudyAction::Record { answered, correct } => {
            let id = db.record_study_session(user, answered, correct, Utc::now())?;
            let mut shell = open_shell(&db)?;
            shell.refresh_counters(&db, Some(user));
            finish(&db, shell, Some(serde_json::json!({ "session_id": id })))
        }
        StudyAction::List => {
            let sessions = db.study_sessions(user)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
            Ok(())
        }
    }
}
