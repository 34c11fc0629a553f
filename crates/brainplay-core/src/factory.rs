//! Weighted question factory.
//!
//! Maps each configured question type to a generator constructor and a
//! relative selection weight. Weighted and explicit selection share the same
//! registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use tracing::info;

use crate::error::QuizError;
use crate::generators::{SquareGenerator, SquareRootGenerator};
use crate::model::{Difficulty, QuestionResult, QuestionType};
use crate::traits::{FactLookup, QuestionGenerator};

/// Builds a generator for one difficulty, with optional fact enrichment.
pub type GeneratorCtor = fn(Difficulty, Option<Arc<dyn FactLookup>>) -> Box<dyn QuestionGenerator>;

fn square_ctor(
    difficulty: Difficulty,
    facts: Option<Arc<dyn FactLookup>>,
) -> Box<dyn QuestionGenerator> {
    let generator = SquareGenerator::new(difficulty);
    match facts {
        Some(facts) => Box::new(generator.with_facts(facts)),
        None => Box::new(generator),
    }
}

fn square_root_ctor(
    difficulty: Difficulty,
    _facts: Option<Arc<dyn FactLookup>>,
) -> Box<dyn QuestionGenerator> {
    Box::new(SquareRootGenerator::new(difficulty))
}

fn ctor_for(question_type: QuestionType) -> GeneratorCtor {
    match question_type {
        QuestionType::Square => square_ctor,
        QuestionType::SquareRoot => square_root_ctor,
    }
}

/// Creates questions by weighted random choice over configured types.
pub struct QuestionFactory {
    generators: HashMap<QuestionType, GeneratorCtor>,
    weights: HashMap<QuestionType, f64>,
    facts: Option<Arc<dyn FactLookup>>,
}

impl Default for QuestionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionFactory {
    /// Both question types with equal weight.
    pub fn new() -> Self {
        let weights = QuestionType::ALL.iter().map(|&t| (t, 0.5)).collect();
        Self::from_weights(weights)
    }

    /// Only the given types, selected in proportion to their weights.
    pub fn with_weights(weights: HashMap<QuestionType, f64>) -> Result<Self, QuizError> {
        if weights.is_empty() {
            return Err(QuizError::InvalidWeights(
                "at least one question type is required".into(),
            ));
        }
        if let Some((t, w)) = weights.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(QuizError::InvalidWeights(format!(
                "weight for {t} must be a non-negative number, got {w}"
            )));
        }
        if weights.values().sum::<f64>() <= 0.0 {
            return Err(QuizError::InvalidWeights(
                "weights must not all be zero".into(),
            ));
        }
        Ok(Self::from_weights(weights))
    }

    fn from_weights(weights: HashMap<QuestionType, f64>) -> Self {
        let generators = weights.keys().map(|&t| (t, ctor_for(t))).collect();
        Self {
            generators,
            weights,
            facts: None,
        }
    }

    /// Share a fact lookup with every generator this factory builds.
    pub fn with_fact_lookup(mut self, facts: Arc<dyn FactLookup>) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Replace the constructor used for `question_type`. Types without a
    /// weight are never selected.
    pub fn with_generator(mut self, question_type: QuestionType, ctor: GeneratorCtor) -> Self {
        if self.weights.contains_key(&question_type) {
            self.generators.insert(question_type, ctor);
        }
        self
    }

    /// Create a question of a randomly chosen type.
    pub async fn create_question(&self, difficulty: Difficulty) -> QuestionResult {
        let selected = self.pick_type();
        let question = self.generate(selected, difficulty).await;
        info!("generated {selected} question in {difficulty} mode");
        question
    }

    /// Create a question of a named type, bypassing weighted selection.
    pub async fn create_specific_question(
        &self,
        question_type: &str,
        difficulty: Difficulty,
    ) -> Result<QuestionResult, QuizError> {
        let selected = question_type
            .parse::<QuestionType>()
            .ok()
            .filter(|t| self.generators.contains_key(t))
            .ok_or_else(|| QuizError::UnknownQuestionType {
                requested: question_type.to_string(),
                available: self
                    .get_available_types()
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            })?;
        Ok(self.generate(selected, difficulty).await)
    }

    /// The configured question types.
    pub fn get_available_types(&self) -> BTreeSet<QuestionType> {
        self.generators.keys().copied().collect()
    }

    /// Relative selection weight per type.
    pub fn weights(&self) -> &HashMap<QuestionType, f64> {
        &self.weights
    }

    fn pick_type(&self) -> QuestionType {
        // Sorted so the index-to-type mapping does not depend on hash order.
        let types: Vec<QuestionType> = self.get_available_types().into_iter().collect();
        let weights: Vec<f64> = types.iter().map(|t| self.weights[t]).collect();
        match WeightedIndex::new(&weights) {
            Ok(dist) => types[dist.sample(&mut rand::rng())],
            // Unreachable for validated weights; fall back to the first type.
            Err(_) => types[0],
        }
    }

    async fn generate(&self, question_type: QuestionType, difficulty: Difficulty) -> QuestionResult {
        let ctor = self.generators[&question_type];
        let generator = ctor(difficulty, self.facts.clone());
        generator.generate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;

    #[test]
    fn default_factory_has_both_types() {
        let factory = QuestionFactory::new();
        let types = factory.get_available_types();
        assert_eq!(types.len(), 2);
        assert!(types.contains(&QuestionType::Square));
        assert!(types.contains(&QuestionType::SquareRoot));
        assert_eq!(factory.weights()[&QuestionType::Square], 0.5);
        assert_eq!(factory.weights()[&QuestionType::SquareRoot], 0.5);
    }

    #[tokio::test]
    async fn create_question_uses_requested_difficulty() {
        let factory = QuestionFactory::new();
        for difficulty in Difficulty::ALL {
            for _ in 0..20 {
                let q = factory.create_question(difficulty).await;
                assert_eq!(q.difficulty(), difficulty);
                assert!(q.check_answer(&q.answer().to_string()));
            }
        }
    }

    #[tokio::test]
    async fn equal_weights_produce_both_types() {
        let factory = QuestionFactory::new();
        let mut squares = 0;
        let mut roots = 0;
        for _ in 0..400 {
            match factory.create_question(Difficulty::Normal).await.question_type() {
                QuestionType::Square => squares += 1,
                QuestionType::SquareRoot => roots += 1,
            }
        }
        // 400 fair draws landing outside 100..=300 is vanishingly unlikely.
        assert!((100..=300).contains(&squares), "squares = {squares}");
        assert_eq!(squares + roots, 400);
    }

    #[tokio::test]
    async fn zero_weight_type_is_never_chosen() {
        let weights = HashMap::from([(QuestionType::Square, 0.0), (QuestionType::SquareRoot, 3.0)]);
        let factory = QuestionFactory::with_weights(weights).unwrap();
        for _ in 0..50 {
            let q = factory.create_question(Difficulty::Hard).await;
            assert_eq!(q.question_type(), QuestionType::SquareRoot);
        }
    }

    #[tokio::test]
    async fn create_specific_question_by_name() {
        let factory = QuestionFactory::new();
        let q = factory
            .create_specific_question("square_root", Difficulty::Easy)
            .await
            .unwrap();
        assert_eq!(q.question_type(), QuestionType::SquareRoot);
        let Answer::Integer(root) = q.answer() else {
            panic!("integer answer expected");
        };
        assert!((1..=10).contains(root));
    }

    #[tokio::test]
    async fn unknown_type_is_rejected_with_valid_set() {
        let factory = QuestionFactory::new();
        let err = factory
            .create_specific_question("bogus", Difficulty::Normal)
            .await
            .unwrap_err();
        match &err {
            QuizError::UnknownQuestionType {
                requested,
                available,
            } => {
                assert_eq!(requested, "bogus");
                assert_eq!(available, &vec!["square".to_string(), "square_root".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("square_root"));
    }

    #[tokio::test]
    async fn unconfigured_type_is_rejected() {
        let weights = HashMap::from([(QuestionType::Square, 1.0)]);
        let factory = QuestionFactory::with_weights(weights).unwrap();
        let err = factory
            .create_specific_question("square_root", Difficulty::Normal)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Available types: square"));
        assert_eq!(factory.get_available_types().len(), 1);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        assert!(QuestionFactory::with_weights(HashMap::new()).is_err());
        assert!(QuestionFactory::with_weights(HashMap::from([(QuestionType::Square, -1.0)])).is_err());
        assert!(
            QuestionFactory::with_weights(HashMap::from([(QuestionType::Square, f64::NAN)])).is_err()
        );
        assert!(QuestionFactory::with_weights(HashMap::from([
            (QuestionType::Square, 0.0),
            (QuestionType::SquareRoot, 0.0)
        ]))
        .is_err());
    }

    struct SevenSquared(Difficulty);

    #[async_trait::async_trait]
    impl QuestionGenerator for SevenSquared {
        fn question_type(&self) -> QuestionType {
            QuestionType::Square
        }

        fn difficulty(&self) -> Difficulty {
            self.0
        }

        async fn generate(&self) -> QuestionResult {
            QuestionResult::new("What is 7²?", Answer::Integer(49), QuestionType::Square, self.0)
        }
    }

    fn seven_squared(
        difficulty: Difficulty,
        _facts: Option<Arc<dyn FactLookup>>,
    ) -> Box<dyn QuestionGenerator> {
        Box::new(SevenSquared(difficulty))
    }

    #[tokio::test]
    async fn with_generator_replaces_constructor() {
        let weights = HashMap::from([(QuestionType::Square, 1.0)]);
        let factory = QuestionFactory::with_weights(weights)
            .unwrap()
            .with_generator(QuestionType::Square, seven_squared)
            .with_generator(QuestionType::SquareRoot, seven_squared);
        let q = factory.create_question(Difficulty::Hard).await;
        assert_eq!(q.text(), "What is 7²?");
        assert_eq!(q.difficulty(), Difficulty::Hard);
        assert_eq!(factory.get_available_types().len(), 1);
    }

    #[tokio::test]
    async fn factory_configuration_is_unchanged_by_use() {
        let factory = QuestionFactory::new();
        let before = factory.weights().clone();
        for _ in 0..10 {
            factory.create_question(Difficulty::Normal).await;
        }
        assert_eq!(factory.weights(), &before);
        assert_eq!(factory.get_available_types().len(), 2);
    }
}
