//! brainplay-core — Question generation, scoring, and persistence.
//!
//! This crate defines the quiz data model, the generator capability and its
//! variants, the weighted question factory, and the per-player score manager
//! with its achievements and on-disk state.

pub mod achievements;
pub mod config;
pub mod error;
pub mod factory;
pub mod generators;
pub mod history;
pub mod model;
pub mod players;
pub mod score;
pub mod sessions;
pub mod store;
pub mod traits;

pub use error::QuizError;
pub use factory::QuestionFactory;
pub use model::{Answer, Difficulty, QuestionResult, QuestionType};
pub use score::{ScoreManager, ScoreUpdate};
