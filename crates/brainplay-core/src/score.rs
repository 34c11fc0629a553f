//! Per-player score bookkeeping.
//!
//! A [`ScoreManager`] owns one player's cumulative score, round counts,
//! history, and achievements. Every mutation is written through to its
//! [`ScoreStore`]; storage failures are logged and never reach the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::achievements::{newly_unlocked, Achievement, AchievementState};
use crate::error::QuizError;
use crate::store::{ScoreSnapshot, ScoreStore};

/// One entry in the score history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChange {
    /// 1-based round index.
    pub round: u32,
    pub points_added: i64,
    pub old_score: i64,
    pub new_score: i64,
    pub timestamp: DateTime<Utc>,
}

/// A point delta that is known to be a strict integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointDelta(pub i64);

impl TryFrom<&Value> for PointDelta {
    type Error = QuizError;

    /// Accepts JSON integers only. Floats are rejected even when whole.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) if !n.is_f64() => n
                .as_i64()
                .map(PointDelta)
                .ok_or_else(|| QuizError::InvalidPointDelta(value.to_string())),
            other => Err(QuizError::InvalidPointDelta(other.to_string())),
        }
    }
}

/// The outcome of one [`ScoreManager::add_points`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub round: u32,
    pub old_score: i64,
    pub new_score: i64,
    /// Whether the round counted as correct (`delta > 0`).
    pub correct: bool,
    /// Achievements unlocked by this call, in evaluation order.
    pub unlocked: Vec<Achievement>,
}

/// Point in a game's score progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub round: u32,
    pub score: i64,
}

/// Summary of the current game, for display and history records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub player_id: String,
    pub current_score: i64,
    pub rounds_played: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Rounded to two decimal places.
    pub accuracy: f64,
    /// Formatted `MM:SS`.
    pub game_duration: String,
    pub achievements: Vec<Achievement>,
    pub score_progression: Vec<ProgressPoint>,
    pub average_points_per_round: f64,
}

/// Score state for one player.
pub struct ScoreManager {
    player_id: String,
    score: i64,
    round_count: u32,
    correct_answers: u32,
    wrong_answers: u32,
    game_start_time: DateTime<Utc>,
    history: Vec<ScoreChange>,
    achievements: Vec<Achievement>,
    store: Box<dyn ScoreStore>,
}

impl ScoreManager {
    /// Create the manager for `player_id`, restoring any state the store
    /// holds for that same player.
    pub fn new(player_id: impl Into<String>, store: Box<dyn ScoreStore>) -> Self {
        let mut manager = Self {
            player_id: player_id.into(),
            score: 0,
            round_count: 0,
            correct_answers: 0,
            wrong_answers: 0,
            game_start_time: Utc::now(),
            history: Vec::new(),
            achievements: Vec::new(),
            store,
        };
        manager.load();
        info!("score manager initialized for player: {}", manager.player_id);
        manager
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Add a round's points.
    ///
    /// Only a positive delta counts as a correct round; zero is wrong. A
    /// delta that would overflow the score or the round counter is rejected
    /// and leaves the state untouched.
    pub fn add_points(&mut self, points: i64) -> Result<ScoreUpdate, QuizError> {
        let old_score = self.score;
        let new_score = old_score
            .checked_add(points)
            .ok_or(QuizError::ScoreOverflow {
                score: old_score,
                points,
            })?;
        let round = self
            .round_count
            .checked_add(1)
            .ok_or(QuizError::RoundLimit(self.round_count))?;
        let correct = points > 0;

        self.score = new_score;
        self.round_count = round;
        if correct {
            self.correct_answers += 1;
        } else {
            self.wrong_answers += 1;
        }
        self.history.push(ScoreChange {
            round,
            points_added: points,
            old_score,
            new_score,
            timestamp: Utc::now(),
        });

        let unlocked = self.check_achievements();
        self.save();

        info!(
            "score updated for {}: {old_score} -> {new_score} ({points:+})",
            self.player_id
        );

        Ok(ScoreUpdate {
            round,
            old_score,
            new_score,
            correct,
            unlocked,
        })
    }

    /// Add points from an untyped value. Anything but a JSON integer is
    /// rejected and leaves the state untouched.
    pub fn add_points_value(&mut self, points: &Value) -> Result<ScoreUpdate, QuizError> {
        let PointDelta(points) = PointDelta::try_from(points)?;
        self.add_points(points)
    }

    pub fn get_score(&self) -> i64 {
        self.score
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    pub fn history(&self) -> &[ScoreChange] {
        &self.history
    }

    /// Unlocked achievements, in unlock order.
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Percentage of correct rounds, 0.0 before any round is played.
    pub fn accuracy(&self) -> f64 {
        let total = self.correct_answers + self.wrong_answers;
        if total == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / total as f64 * 100.0
    }

    /// Time since the game started, as `MM:SS`.
    pub fn game_duration(&self) -> String {
        let secs = (Utc::now() - self.game_start_time).num_seconds().max(0);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn statistics(&self) -> GameStatistics {
        let average_points_per_round = if self.history.is_empty() {
            0.0
        } else {
            self.history.iter().map(|c| c.points_added).sum::<i64>() as f64
                / self.history.len() as f64
        };

        GameStatistics {
            player_id: self.player_id.clone(),
            current_score: self.score,
            rounds_played: self.round_count,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            accuracy: (self.accuracy() * 100.0).round() / 100.0,
            game_duration: self.game_duration(),
            achievements: self.achievements.clone(),
            score_progression: self
                .history
                .iter()
                .map(|c| ProgressPoint {
                    round: c.round,
                    score: c.new_score,
                })
                .collect(),
            average_points_per_round,
        }
    }

    /// Zero the score and counters, clear history and achievements, and
    /// restart the game clock.
    pub fn reset_score(&mut self) {
        info!("resetting score for {} from {}", self.player_id, self.score);

        self.score = 0;
        self.round_count = 0;
        self.correct_answers = 0;
        self.wrong_answers = 0;
        self.game_start_time = Utc::now();
        self.history.clear();
        self.achievements.clear();

        self.save();
    }

    /// The state as it would be persisted.
    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            player_id: self.player_id.clone(),
            score: self.score,
            round_count: self.round_count,
            correct_answers: self.correct_answers,
            wrong_answers: self.wrong_answers,
            game_start_time: self.game_start_time,
            score_history: self.history.clone(),
            achievements: self.achievements.clone(),
            last_updated: Some(Utc::now()),
        }
    }

    fn achievement_state(&self) -> AchievementState<'_> {
        AchievementState {
            score: self.score,
            round_count: self.round_count,
            accuracy: self.accuracy(),
            all_correct: self.round_count > 0 && self.wrong_answers == 0,
            history: &self.history,
        }
    }

    fn check_achievements(&mut self) -> Vec<Achievement> {
        let unlocked = newly_unlocked(&self.achievement_state(), &self.achievements);
        for achievement in &unlocked {
            info!("achievement unlocked for {}: {achievement}", self.player_id);
        }
        self.achievements.extend(unlocked.iter().copied());
        unlocked
    }

    fn save(&self) {
        if let Err(e) = self.store.save(&self.snapshot()) {
            error!("failed to save score for {}: {e:#}", self.player_id);
        }
    }

    fn load(&mut self) {
        match self.store.load(&self.player_id) {
            Ok(Some(snapshot)) if snapshot.player_id == self.player_id && !snapshot.is_consistent() => {
                warn!(
                    "stored score for {} does not match its history; starting fresh",
                    self.player_id
                );
            }
            Ok(Some(snapshot)) if snapshot.player_id == self.player_id => {
                self.score = snapshot.score;
                self.round_count = snapshot.round_count;
                self.correct_answers = snapshot.correct_answers;
                self.wrong_answers = snapshot.wrong_answers;
                self.game_start_time = snapshot.game_start_time;
                self.history = snapshot.score_history;
                self.achievements = snapshot.achievements;
                info!("loaded previous score for {}: {}", self.player_id, self.score);
            }
            Ok(Some(snapshot)) => {
                warn!(
                    "stored score belongs to {}, not {}; starting fresh",
                    snapshot.player_id, self.player_id
                );
            }
            Ok(None) => {
                info!("no previous score found for {}", self.player_id);
            }
            Err(e) => {
                warn!("failed to load previous score for {}: {e:#}", self.player_id);
            }
        }
    }
}
