//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Durable flags and persisted shell state (key-value store)
//! - Study sessions, aggregated into visitor counters
//! - A local question bank

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::counters::{CounterSource, Counters};
use crate::error::{CoreError, DatabaseError, Result};
use crate::flags::{FlagBackend, FlagKey};
use crate::question::{Question, QuestionFilter, QuestionSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySessionRecord {
    pub id: i64,
    pub user_id: String,
    pub questions_answered: u64,
    pub correct_answers: u64,
    pub completed_at: DateTime<Utc>,
}

/// SQLite database backing flags, counters and the question bank.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/barprep/barprep.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("barprep.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Drop every well-known flag. Hosting-environment reset, not part of
    /// the flag store contract.
    pub fn clear_flags(&self) -> Result<usize> {
        let mut removed = 0;
        for key in FlagKey::all() {
            removed += self
                .conn
                .execute("DELETE FROM kv WHERE key = ?1", params![key.as_str()])?;
        }
        Ok(removed)
    }

    // ── Study sessions ───────────────────────────────────────────────

    /// Record a finished study session. `correct` is clamped to `answered`.
    pub fn record_study_session(
        &self,
        user_id: &str,
        answered: u64,
        correct: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO study_sessions (user_id, questions_answered, correct_answers, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                answered,
                correct.min(answered),
                completed_at.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn study_sessions(&self, user_id: &str) -> Result<Vec<StudySessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, questions_answered, correct_answers, completed_at
             FROM study_sessions
             WHERE user_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, user_id, questions_answered, correct_answers, completed_at) = row?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp: {e}")))?;
            sessions.push(StudySessionRecord {
                id,
                user_id,
                questions_answered,
                correct_answers,
                completed_at,
            });
        }
        Ok(sessions)
    }

    /// Cumulative `(answered, correct)` for a user.
    pub fn study_totals(&self, user_id: &str) -> Result<(u64, u64)> {
        let totals = self.conn.query_row(
            "SELECT COALESCE(SUM(questions_answered), 0), COALESCE(SUM(correct_answers), 0)
             FROM study_sessions
             WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        Ok(totals)
    }

    // ── Question bank ────────────────────────────────────────────────

    /// Insert or replace a question.
    pub fn upsert_question(&self, q: &Question) -> Result<()> {
        q.validate()?;
        let options = serde_json::to_string(&q.options)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO questions
                (id, area, exam, year, number, statement, options, correct_option)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                q.id,
                q.area,
                q.exam,
                q.year,
                q.number,
                q.statement,
                options,
                q.correct_option
            ],
        )?;
        Ok(())
    }

    /// Import a batch in one transaction. Returns how many were written.
    pub fn import_questions(&self, questions: &[Question]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for q in questions {
            self.upsert_question(q)?;
        }
        tx.commit()?;
        Ok(questions.len())
    }

    pub fn question_count(&self) -> Result<u64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?)
    }

    fn query_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let mut sql = String::from(
            "SELECT id, area, exam, year, number, statement, options, correct_option
             FROM questions WHERE 1 = 1",
        );
        let mut args: Vec<rusqlite::types::Value> = Vec::new();

        if !filter.areas.is_empty() {
            let placeholders = vec!["?"; filter.areas.len()].join(", ");
            sql.push_str(&format!(" AND area IN ({placeholders})"));
            args.extend(filter.areas.iter().cloned().map(Into::into));
        }
        if let Some(exam) = &filter.exam {
            sql.push_str(" AND exam = ?");
            args.push(exam.clone().into());
        }
        if let Some(year) = filter.year {
            sql.push_str(" AND year = ?");
            args.push(i64::from(year).into());
        }
        sql.push_str(" ORDER BY rowid");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(i64::try_from(limit).unwrap_or(i64::MAX).into());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u16>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut questions = Vec::new();
        for row in rows {
            let (id, area, exam, year, number, statement, options, correct_option) = row?;
            questions.push(Question {
                id,
                area,
                exam,
                year,
                number,
                statement,
                options: serde_json::from_str(&options)?,
                correct_option,
            });
        }
        Ok(questions)
    }
}

impl FlagBackend for Database {
    fn read_flag(&self, key: &str) -> Result<Option<bool>> {
        match self.kv_get(key)? {
            None => Ok(None),
            Some(v) => v
                .parse::<bool>()
                .map(Some)
                .map_err(|_| CoreError::Custom(format!("flag {key} holds non-boolean '{v}'"))),
        }
    }

    fn write_flag(&self, key: &str, value: bool) -> Result<()> {
        self.kv_set(key, if value { "true" } else { "false" })
    }
}

impl CounterSource for Database {
    /// Anonymous visitors have no profile and no history.
    fn fetch_counters(&self, identity: Option<&str>) -> Result<Counters> {
        match identity {
            None => Ok(Counters::default()),
            Some(user_id) => {
                let (answered, correct) = self.study_totals(user_id)?;
                Ok(Counters::new(answered, correct, true))
            }
        }
    }
}

impl QuestionSource for Database {
    fn fetch_question_pool(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        self.query_questions(filter)
    }
}
