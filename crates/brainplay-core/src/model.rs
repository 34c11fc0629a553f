//! Core data model types for brainplay.
//!
//! Difficulty levels, question types, canonical answers, and the immutable
//! question value every generator produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

/// Absolute tolerance for numeric answers. Not scaled by answer magnitude.
pub const ANSWER_TOLERANCE: f64 = 0.01;

/// Difficulty level chosen by the player.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Range multiplier for this level.
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Adjust an inclusive `(min, max)` range for this level.
    ///
    /// Easy caps the max at 60% of itself, hard raises it by half, normal
    /// leaves the range alone. The minimum is never changed.
    pub fn adjust_range(&self, (min, max): (i64, i64)) -> (i64, i64) {
        match self {
            Difficulty::Easy => (min, max.min((max as f64 * 0.6).floor() as i64)),
            Difficulty::Normal => (min, max),
            Difficulty::Hard => (min, (max as f64 * 1.5).floor() as i64),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Normal => write!(f, "normal"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuizError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// The closed set of question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Square,
    SquareRoot,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::Square, QuestionType::SquareRoot];

    /// Stable identifier used in config files and on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Square => "square",
            QuestionType::SquareRoot => "square_root",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(QuestionType::Square),
            "square_root" => Ok(QuestionType::SquareRoot),
            other => Err(QuizError::UnknownQuestionType {
                requested: other.to_string(),
                available: QuestionType::ALL
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

/// Canonical answer to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Answer {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Answer::Integer(n) => Some(*n as f64),
            Answer::Float(x) => Some(*x),
            Answer::Text(_) => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Integer(n) => write!(f, "{n}"),
            Answer::Float(x) => write!(f, "{x}"),
            Answer::Text(s) => f.write_str(s),
        }
    }
}

/// A generated question and its expected answer.
///
/// Fields are private: a question is never changed after its generator
/// builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    text: String,
    answer: Answer,
    question_type: QuestionType,
    difficulty: Difficulty,
}

impl QuestionResult {
    pub fn new(
        text: impl Into<String>,
        answer: Answer,
        question_type: QuestionType,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            text: text.into(),
            answer,
            question_type,
            difficulty,
        }
    }

    /// Display text shown to the player.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Check a raw player answer against the canonical one.
    ///
    /// Numeric answers accept anything that parses as a float within
    /// [`ANSWER_TOLERANCE`]; unparseable input is simply wrong. Text answers
    /// compare case-insensitively, ignoring whitespace around the input.
    pub fn check_answer(&self, raw_input: &str) -> bool {
        match self.answer.as_f64() {
            Some(expected) => match raw_input.trim().parse::<f64>() {
                Ok(given) => (given - expected).abs() < ANSWER_TOLERANCE,
                Err(_) => false,
            },
            None => self.answer.to_string().to_lowercase() == raw_input.trim().to_lowercase(),
        }
    }
}
