//! Mock lookup for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use brainplay_core::traits::FactLookup;

/// A lookup that always returns the same fact (or none) without any I/O.
pub struct MockLookup {
    fact: Option<String>,
    call_count: AtomicU32,
    last_number: Mutex<Option<i64>>,
}

impl MockLookup {
    /// Create a mock that always returns `fact`.
    pub fn with_fact(fact: &str) -> Self {
        Self {
            fact: Some(fact.to_string()),
            call_count: AtomicU32::new(0),
            last_number: Mutex::new(None),
        }
    }

    /// Create a mock that never has a fact.
    pub fn empty() -> Self {
        Self {
            fact: None,
            call_count: AtomicU32::new(0),
            last_number: Mutex::new(None),
        }
    }

    /// Get the number of lookups made.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the number most recently looked up.
    pub fn last_number(&self) -> Option<i64> {
        *self.last_number.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FactLookup for MockLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fact_for(&self, number: i64) -> Option<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_number.lock().unwrap_or_else(|e| e.into_inner()) = Some(number);
        self.fact.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use brainplay_core::generators::SquareGenerator;
    use brainplay_core::traits::QuestionGenerator;
    use brainplay_core::Difficulty;

    #[tokio::test]
    async fn fixed_fact() {
        let lookup = MockLookup::with_fact("a fact");
        assert_eq!(lookup.fact_for(5).await.as_deref(), Some("a fact"));
        assert_eq!(lookup.call_count(), 1);
        assert_eq!(lookup.last_number(), Some(5));
    }

    #[tokio::test]
    async fn empty_lookup() {
        let lookup = MockLookup::empty();
        assert!(lookup.fact_for(5).await.is_none());
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn hint_is_for_the_asked_number() {
        let lookup = Arc::new(MockLookup::with_fact("it is a number"));
        let generator = SquareGenerator::new(Difficulty::Easy).with_facts(lookup.clone());
        let question = generator.generate().await;

        let n = lookup.last_number().unwrap();
        assert!(question.text().starts_with(&format!("What is {n}²?")));
        assert!(question.text().ends_with("\nHint: it is a number"));
    }
}
