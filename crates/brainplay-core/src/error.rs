//! Quiz error types.
//!
//! Only configuration and contract violations are errors. I/O failures in
//! the score manager and the fact lookup are absorbed where they happen.

use thiserror::Error;

/// Errors surfaced to callers of the quiz engine.
#[derive(Debug, Error)]
pub enum QuizError {
    /// A question type was requested that the factory has no generator for.
    #[error("unknown question type: {requested}. Available types: {}", .available.join(", "))]
    UnknownQuestionType {
        requested: String,
        available: Vec<String>,
    },

    /// A difficulty name that is not easy, normal, or hard.
    #[error("unknown difficulty: {0} (expected easy, normal, or hard)")]
    UnknownDifficulty(String),

    /// A point delta that is not a strict integer.
    #[error("points must be an integer, got {0}")]
    InvalidPointDelta(String),

    /// Question weights that cannot form a probability distribution.
    #[error("invalid question weights: {0}")]
    InvalidWeights(String),

    /// Adding the delta would overflow the score.
    #[error("adding {points} to score {score} overflows")]
    ScoreOverflow { score: i64, points: i64 },

    /// The round counter is already at its maximum.
    #[error("round limit reached after {0} rounds")]
    RoundLimit(u32),
}
