use barprep_core::Database;

use super::{finish, open_shell, CmdResult};

pub fn run(name: &str) -> CmdResult {
    let db = Database::open()?;
    let mut shell = open_shell(&db)?;
    let tab = shell.select_section(name)?;
    finish(&db, shell, Some(tab))
}
