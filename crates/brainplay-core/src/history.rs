//! Per-round records and the bounded game history file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{Difficulty, QuestionType};
use crate::score::GameStatistics;
use crate::store::write_json;

/// Maximum number of games kept in `game_history.json`.
pub const MAX_GAMES: usize = 100;

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub session_id: String,
    pub player_name: String,
    pub round_number: u32,
    pub question_type: QuestionType,
    pub question_text: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub points_earned: i64,
    pub total_score: i64,
    pub timestamp: DateTime<Utc>,
    pub difficulty: Difficulty,
}

/// Aggregate figures over a game's rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStatistics {
    pub total_rounds: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    pub accuracy: f64,
    pub total_points: i64,
    pub average_points: f64,
    pub question_types: BTreeMap<QuestionType, usize>,
}

impl RoundStatistics {
    pub fn from_rounds(rounds: &[RoundRecord]) -> Self {
        if rounds.is_empty() {
            return Self::default();
        }

        let total = rounds.len();
        let correct = rounds.iter().filter(|r| r.is_correct).count();
        let total_points: i64 = rounds.iter().map(|r| r.points_earned).sum();
        let mut question_types = BTreeMap::new();
        for round in rounds {
            *question_types.entry(round.question_type).or_insert(0) += 1;
        }

        Self {
            total_rounds: total,
            correct_answers: correct,
            wrong_answers: total - correct,
            accuracy: correct as f64 / total as f64 * 100.0,
            total_points,
            average_points: total_points as f64 / total as f64,
            question_types,
        }
    }
}

/// A finished game as stored in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub session_id: String,
    pub player_name: String,
    pub mode: Difficulty,
    pub final_score: i64,
    pub won: bool,
    pub rounds: Vec<RoundRecord>,
    pub session_duration_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub statistics: RoundStatistics,
    #[serde(default)]
    pub game: Option<GameStatistics>,
}

/// The last [`MAX_GAMES`] games in `{data_dir}/game_history.json`.
pub struct GameHistory {
    path: PathBuf,
}

impl GameHistory {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("game_history.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored games, oldest first. Missing, unreadable, or non-list
    /// files yield an empty history.
    pub fn load(&self) -> Vec<GameRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("skipping malformed game record: {e}");
                        None
                    }
                })
                .collect(),
            Ok(_) => {
                warn!("game history is not a list, ignoring {}", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("failed to parse game history: {e}");
                Vec::new()
            }
        }
    }

    pub fn append(&self, record: GameRecord) -> Result<()> {
        let mut games = self.load();
        let session_id = record.session_id.clone();
        games.push(record);
        if games.len() > MAX_GAMES {
            games.drain(..games.len() - MAX_GAMES);
        }
        write_json(&self.path, &games)?;
        info!("saved game history for session {session_id}");
        Ok(())
    }

    /// The `n` most recent games, newest first.
    pub fn recent(&self, n: usize) -> Vec<GameRecord> {
        let mut games = self.load();
        games.reverse();
        games.truncate(n);
        games
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn round(n: u32, qtype: QuestionType, correct: bool) -> RoundRecord {
        RoundRecord {
            session_id: "s1".into(),
            player_name: "Ada".into(),
            round_number: n,
            question_type: qtype,
            question_text: "What is 4²?".into(),
            correct_answer: "16".into(),
            user_answer: if correct { "16".into() } else { "15".into() },
            is_correct: correct,
            points_earned: if correct { 10 } else { -5 },
            total_score: 0,
            timestamp: Utc::now(),
            difficulty: Difficulty::Normal,
        }
    }

    fn game(session_id: &str, score: i64) -> GameRecord {
        let rounds = vec![round(1, QuestionType::Square, true)];
        GameRecord {
            session_id: session_id.into(),
            player_name: "Ada".into(),
            mode: Difficulty::Normal,
            final_score: score,
            won: false,
            statistics: RoundStatistics::from_rounds(&rounds),
            rounds,
            session_duration_secs: 1.5,
            timestamp: Utc::now(),
            game: None,
        }
    }

    #[test]
    fn statistics_over_rounds() {
        let rounds = vec![
            round(1, QuestionType::Square, true),
            round(2, QuestionType::SquareRoot, false),
            round(3, QuestionType::Square, true),
            round(4, QuestionType::Square, true),
        ];
        let stats = RoundStatistics::from_rounds(&rounds);
        assert_eq!(stats.total_rounds, 4);
        assert_eq!(stats.correct_answers, 3);
        assert_eq!(stats.wrong_answers, 1);
        assert_eq!(stats.accuracy, 75.0);
        assert_eq!(stats.total_points, 25);
        assert_eq!(stats.average_points, 6.25);
        assert_eq!(stats.question_types[&QuestionType::Square], 3);
        assert_eq!(stats.question_types[&QuestionType::SquareRoot], 1);
    }

    #[test]
    fn statistics_for_no_rounds() {
        assert_eq!(RoundStatistics::from_rounds(&[]), RoundStatistics::default());
    }

    #[test]
    fn missing_or_non_list_history_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = GameHistory::open(dir.path());
        assert!(history.load().is_empty());

        std::fs::write(history.path(), r#"{"games": []}"#).unwrap();
        assert!(history.load().is_empty());

        std::fs::write(history.path(), "garbage").unwrap();
        assert!(history.load().is_empty());
    }

    #[test]
    fn append_and_recent() {
        let dir = TempDir::new().unwrap();
        let history = GameHistory::open(dir.path());
        history.append(game("a", 10)).unwrap();
        history.append(game("b", 20)).unwrap();
        history.append(game("c", 30)).unwrap();

        let recent = history.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_id, "c");
        assert_eq!(recent[1].session_id, "b");
    }

    #[test]
    fn history_is_capped() {
        let dir = TempDir::new().unwrap();
        let history = GameHistory::open(dir.path());
        for i in 0..MAX_GAMES + 5 {
            history.append(game(&format!("g{i}"), i as i64)).unwrap();
        }
        let games = history.load();
        assert_eq!(games.len(), MAX_GAMES);
        assert_eq!(games[0].session_id, "g5");
    }
}
