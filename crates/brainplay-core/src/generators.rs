//! Square and square-root question generators.

use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::model::{Answer, Difficulty, QuestionResult, QuestionType};
use crate::traits::{FactLookup, QuestionGenerator};

/// Base draw range for square questions, before difficulty adjustment.
pub const SQUARE_BASE_RANGE: (i64, i64) = (1, 20);

/// Asks for the square of a random number.
pub struct SquareGenerator {
    difficulty: Difficulty,
    facts: Option<Arc<dyn FactLookup>>,
}

impl SquareGenerator {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            facts: None,
        }
    }

    /// Attach a fact lookup used to add a hint to each question.
    pub fn with_facts(mut self, facts: Arc<dyn FactLookup>) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Inclusive range numbers are drawn from at this difficulty.
    pub fn range(&self) -> (i64, i64) {
        self.difficulty.adjust_range(SQUARE_BASE_RANGE)
    }

    /// Build the question for a given draw, without enrichment.
    pub fn question_for(&self, base: i64) -> QuestionResult {
        self.build(base, None)
    }

    fn build(&self, base: i64, fact: Option<String>) -> QuestionResult {
        let mut text = format!("What is {base}²? (What is {base} squared?)");
        if let Some(fact) = fact {
            text.push_str(&format!("\nHint: {fact}"));
        }
        QuestionResult::new(
            text,
            Answer::Integer(base * base),
            QuestionType::Square,
            self.difficulty,
        )
    }
}

#[async_trait]
impl QuestionGenerator for SquareGenerator {
    fn question_type(&self) -> QuestionType {
        QuestionType::Square
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    async fn generate(&self) -> QuestionResult {
        let (min, max) = self.range();
        let base = rand::rng().random_range(min..=max);

        let fact = match &self.facts {
            Some(facts) => facts.fact_for(base).await,
            None => None,
        };

        debug!("generated square question: {base}² = {}", base * base);
        self.build(base, fact)
    }
}

/// Asks for the root of a perfect square.
pub struct SquareRootGenerator {
    difficulty: Difficulty,
    perfect_squares: Vec<i64>,
}

impl SquareRootGenerator {
    pub fn new(difficulty: Difficulty) -> Self {
        let upper = match difficulty {
            Difficulty::Easy => 10,
            Difficulty::Normal => 50,
            Difficulty::Hard => 100,
        };
        Self {
            difficulty,
            perfect_squares: (1..=upper).map(|i| i * i).collect(),
        }
    }

    /// The perfect squares this generator picks from.
    pub fn perfect_squares(&self) -> &[i64] {
        &self.perfect_squares
    }

    /// Build the question for a given perfect square.
    pub fn question_for(&self, square: i64) -> QuestionResult {
        let root = integer_sqrt(square);
        QuestionResult::new(
            format!("What is √{square}? (What is the square root of {square}?)"),
            Answer::Integer(root),
            QuestionType::SquareRoot,
            self.difficulty,
        )
    }
}

#[async_trait]
impl QuestionGenerator for SquareRootGenerator {
    fn question_type(&self) -> QuestionType {
        QuestionType::SquareRoot
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    async fn generate(&self) -> QuestionResult {
        // The list is never empty: every difficulty has at least 1².
        let square = self
            .perfect_squares
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(1);

        let question = self.question_for(square);
        debug!("generated square root question: √{square} = {}", question.answer());
        question
    }
}

fn integer_sqrt(n: i64) -> i64 {
    let mut root = (n as f64).sqrt() as i64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}
