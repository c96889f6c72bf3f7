//! Questions as the core sees them, and the collaborators that supply and
//! present them.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

pub type QuestionId = String;

/// A past-exam question.
///
/// The engines only look at `id`; the remaining fields are for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub area: String,
    pub exam: String,
    pub year: u16,
    #[serde(default)]
    pub number: u32,
    pub statement: String,
    pub options: Vec<String>,
    /// Letter of the correct option (`A`, `B`, ...).
    pub correct_option: String,
}

impl Question {
    /// Letter for the option at `index` (0 → `A`).
    pub fn option_letter(index: usize) -> Option<char> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map(|i| (b'A' + i) as char)
    }

    /// Whether `selected` names the correct option. Case-insensitive.
    pub fn is_correct(&self, selected: &str) -> bool {
        selected.trim().eq_ignore_ascii_case(self.correct_option.trim())
    }

    /// Reject questions a renderer could not present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "id".into(),
                message: "must not be empty".into(),
            });
        }
        if self.options.is_empty() {
            return Err(ValidationError::EmptyCollection(format!(
                "options of question {}",
                self.id
            )));
        }
        if !self.has_option(&self.correct_option) {
            return Err(ValidationError::InvalidValue {
                field: "correct_option".into(),
                message: format!(
                    "'{}' is not among {} options",
                    self.correct_option,
                    self.options.len()
                ),
            });
        }
        Ok(())
    }

    /// Whether `selected` is one of this question's option letters.
    pub fn has_option(&self, selected: &str) -> bool {
        let selected = selected.trim();
        (0..self.options.len())
            .filter_map(Self::option_letter)
            .any(|l| selected.eq_ignore_ascii_case(&l.to_string()))
    }
}

/// Criteria for a pool fetch. Empty `areas` means any area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub areas: Vec<String>,
    pub exam: Option<String>,
    pub year: Option<u16>,
    pub limit: Option<usize>,
}

impl QuestionFilter {
    pub fn areas<I, S>(areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            areas: areas.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, q: &Question) -> bool {
        (self.areas.is_empty() || self.areas.iter().any(|a| a == &q.area))
            && self.exam.as_ref().map_or(true, |e| e == &q.exam)
            && self.year.map_or(true, |y| y == q.year)
    }
}

/// Remote question bank.
pub trait QuestionSource {
    fn fetch_question_pool(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;
}

impl<T: QuestionSource + ?Sized> QuestionSource for &T {
    fn fetch_question_pool(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        (**self).fetch_question_pool(filter)
    }
}

/// In-memory question bank.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionSource for QuestionBank {
    fn fetch_question_pool(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let matching = self.questions.iter().filter(|q| filter.matches(q)).cloned();
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}

/// What the visitor picked for a served question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub selected: String,
    pub correct: bool,
}

/// Presentation collaborator: shows one question and returns the answer.
pub trait QuestionRenderer {
    fn render(&mut self, question: &Question) -> UserAnswer;
}

/// Renderer that always picks the same option letter.
#[derive(Debug, Clone)]
pub struct FixedChoice(pub String);

impl QuestionRenderer for FixedChoice {
    fn render(&mut self, question: &Question) -> UserAnswer {
        UserAnswer {
            correct: question.is_correct(&self.0),
            selected: self.0.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_question(id: &str, area: &str) -> Question {
    Question {
        id: id.to_string(),
        area: area.to_string(),
        exam: "XXXVIII".to_string(),
        year: 2023,
        number: 1,
        statement: format!("Statement for {id}"),
        options: vec!["one".into(), "two".into(), "three".into(), "four".into()],
        correct_option: "B".to_string(),
    }
}
