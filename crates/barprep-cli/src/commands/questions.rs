use std::path::PathBuf;

use barprep_core::{Database, Question, QuestionFilter, QuestionSource};
use clap::Subcommand;

use super::CmdResult;

#[derive(Subcommand)]
pub enum QuestionsAction {
    /// Import questions from a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// List questions in the local bank
    List {
        /// Restrict to an area (repeatable)
        #[arg(long)]
        area: Vec<String>,
        /// Maximum number of questions
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: QuestionsAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        QuestionsAction::Import { file } => {
            let content = std::fs::read_to_string(&file)?;
            let questions: Vec<Question> = serde_json::from_str(&content)?;
            let imported = db.import_questions(&questions)?;
            println!(
                "{}",
                serde_json::json!({ "imported": imported, "total": db.question_count()? })
            );
        }
        QuestionsAction::List { area, limit } => {
            let mut filter = QuestionFilter::areas(area);
            filter.limit = limit;
            let questions = db.fetch_question_pool(&filter)?;
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
    }
    Ok(())
}
