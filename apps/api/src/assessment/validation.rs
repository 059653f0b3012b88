use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::catalog::models::{Question, QuestionKind, LIKERT_MAX, LIKERT_MIN};

/// A validated answer, aligned by index with its question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Likert(i64),
    Text(String),
}

impl Answer {
    pub fn likert(&self) -> Option<i64> {
        match self {
            Answer::Likert(v) => Some(*v),
            Answer::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expected {expected} answers, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("answer {index} must be a whole number between 1 and 4, got {value}")]
    LikertOutOfRange { index: usize, value: String },

    #[error("answer {index} must be one of {allowed:?}, got {value}")]
    NotAllowed {
        index: usize,
        value: i64,
        allowed: Vec<i64>,
    },

    #[error("answer {index} must be non-empty text")]
    EmptyText { index: usize },

    #[error("profiling question '{0}' was not answered")]
    MissingProfileAnswer(String),

    #[error("'{value}' is not a valid option for profiling question '{key}'")]
    InvalidProfileChoice { key: String, value: String },

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// Validates raw answers against the package questions.
///
/// The answer count must equal the question count. Likert answers must be
/// whole numbers (or numeric strings) in 1..=4 and among the question's
/// options; open answers must be non-empty text.
pub fn validate_answers(
    questions: &[Question],
    raw: &[Value],
) -> Result<Vec<Answer>, ValidationError> {
    if raw.len() != questions.len() {
        return Err(ValidationError::LengthMismatch {
            expected: questions.len(),
            actual: raw.len(),
        });
    }

    questions
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (question, value))| match question.kind {
            QuestionKind::Likert => validate_likert(index, question, value).map(Answer::Likert),
            QuestionKind::Open => validate_text(index, value).map(Answer::Text),
        })
        .collect()
}

fn validate_likert(
    index: usize,
    question: &Question,
    value: &Value,
) -> Result<i64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    let v = parsed
        .filter(|v| (LIKERT_MIN..=LIKERT_MAX).contains(v))
        .ok_or_else(|| ValidationError::LikertOutOfRange {
            index,
            value: value.to_string(),
        })?;

    let allowed = question.allowed_values();
    if !allowed.contains(&v) {
        return Err(ValidationError::NotAllowed {
            index,
            value: v,
            allowed,
        });
    }
    Ok(v)
}

fn validate_text(index: usize, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ValidationError::EmptyText { index }),
    }
}

/// Loose shape check: one '@' with a dotted domain after it.
pub fn validate_email(address: &str) -> Result<String, ValidationError> {
    let address = address.trim();
    let valid = match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(address.to_string())
    } else {
        Err(ValidationError::InvalidEmail(address.to_string()))
    }
}
