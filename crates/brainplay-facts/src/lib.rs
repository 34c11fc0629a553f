//! brainplay-facts — Number trivia used as question hints.
//!
//! Implements the `FactLookup` trait against a numbersapi-style HTTP
//! service, plus a mock lookup for tests and offline play.

pub mod config;
pub mod error;
pub mod mock;
pub mod numbers;

pub use config::create_fact_lookup;
pub use error::LookupError;
pub use mock::MockLookup;
pub use numbers::NumbersApiLookup;
