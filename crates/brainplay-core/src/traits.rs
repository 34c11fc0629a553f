//! Core trait definitions for question generators and fact enrichment.
//!
//! Generators live in this crate; the network fact lookup is implemented by
//! `brainplay-facts`.

use async_trait::async_trait;

use crate::model::{Difficulty, QuestionResult, QuestionType};

// ---------------------------------------------------------------------------
// Question generator trait
// ---------------------------------------------------------------------------

/// A source of questions of one type at one difficulty.
///
/// Generation always succeeds. Anything that can fail (such as enrichment)
/// must degrade to a plainer question instead.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// The kind of question this generator produces.
    fn question_type(&self) -> QuestionType;

    /// The difficulty this generator was built for.
    fn difficulty(&self) -> Difficulty;

    /// Produce a fresh question.
    async fn generate(&self) -> QuestionResult;
}

// ---------------------------------------------------------------------------
// Fact lookup trait
// ---------------------------------------------------------------------------

/// Best-effort lookup of a short trivia fact about a number.
///
/// Implementations absorb their own failures and return `None`; they must
/// also bound their own latency.
#[async_trait]
pub trait FactLookup: Send + Sync {
    /// Human-readable lookup name (e.g. "numbersapi").
    fn name(&self) -> &str;

    /// Fetch a fact about `number`, if one is available in time.
    async fn fact_for(&self, number: i64) -> Option<String>;
}
