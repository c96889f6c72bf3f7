use barprep_core::{Database, FlagBackend, FlagKey};
use clap::Subcommand;

use super::{CmdResult, NAVIGATOR_KEY};

#[derive(Subcommand)]
pub enum FlagsAction {
    /// List onboarding flags
    List,
    /// Clear all flags and the saved view state
    Reset,
}

pub fn run(action: FlagsAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        FlagsAction::List => {
            let mut flags = serde_json::Map::new();
            for key in FlagKey::all() {
                let value = db.read_flag(key.as_str())?.unwrap_or(false);
                flags.insert(key.as_str().to_string(), value.into());
            }
            println!("{}", serde_json::to_string_pretty(&flags)?);
        }
        FlagsAction::Reset => {
            let removed = db.clear_flags()?;
            db.kv_delete(NAVIGATOR_KEY)?;
            println!("{}", serde_json::json!({ "cleared": removed }));
        }
    }
    Ok(())
}
