//! Achievement definitions and evaluation.
//!
//! Evaluation is a pure function of the current score state, so replaying the
//! same history always yields the same set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::score::ScoreChange;

/// Number of most recent rounds that must all be correct for a streak.
pub const STREAK_LENGTH: usize = 5;

/// A one-way flag unlocked the first time its threshold is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    #[serde(rename = "First Points")]
    FirstPoints,
    #[serde(rename = "Half Century")]
    HalfCentury,
    #[serde(rename = "Century")]
    Century,
    #[serde(rename = "Perfect Start")]
    PerfectStart,
    #[serde(rename = "Sharp Shooter")]
    SharpShooter,
    #[serde(rename = "Hot Streak")]
    HotStreak,
}

impl Achievement {
    /// All achievements in evaluation order.
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstPoints,
        Achievement::HalfCentury,
        Achievement::Century,
        Achievement::PerfectStart,
        Achievement::SharpShooter,
        Achievement::HotStreak,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstPoints => "First Points",
            Achievement::HalfCentury => "Half Century",
            Achievement::Century => "Century",
            Achievement::PerfectStart => "Perfect Start",
            Achievement::SharpShooter => "Sharp Shooter",
            Achievement::HotStreak => "Hot Streak",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The inputs achievement rules look at.
#[derive(Debug, Clone, Copy)]
pub struct AchievementState<'a> {
    pub score: i64,
    pub round_count: u32,
    /// Percentage in `0.0..=100.0`.
    pub accuracy: f64,
    /// True when every round so far was correct.
    pub all_correct: bool,
    pub history: &'a [ScoreChange],
}

impl Achievement {
    fn is_met(&self, state: &AchievementState<'_>) -> bool {
        match self {
            Achievement::FirstPoints => state.score >= 10,
            Achievement::HalfCentury => state.score >= 50,
            Achievement::Century => state.score >= 100,
            Achievement::PerfectStart => state.round_count >= 5 && state.all_correct,
            Achievement::SharpShooter => state.round_count >= 10 && state.accuracy >= 90.0,
            Achievement::HotStreak => {
                state.history.len() >= STREAK_LENGTH
                    && state.history[state.history.len() - STREAK_LENGTH..]
                        .iter()
                        .all(|change| change.points_added > 0)
            }
        }
    }
}

/// Every achievement whose condition holds for `state`.
pub fn evaluate(state: &AchievementState<'_>) -> Vec<Achievement> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.is_met(state))
        .collect()
}

/// Achievements that hold for `state` but are not yet in `unlocked`.
pub fn newly_unlocked(state: &AchievementState<'_>, unlocked: &[Achievement]) -> Vec<Achievement> {
    evaluate(state)
        .into_iter()
        .filter(|a| !unlocked.contains(a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn history(deltas: &[i64]) -> Vec<ScoreChange> {
        let mut score = 0;
        deltas
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let old = score;
                score += d;
                ScoreChange {
                    round: i as u32 + 1,
                    points_added: d,
                    old_score: old,
                    new_score: score,
                    timestamp: Utc::now(),
                }
            })
            .collect()
    }

    fn state(history: &[ScoreChange]) -> AchievementState<'_> {
        let correct = history.iter().filter(|c| c.points_added > 0).count() as u32;
        let rounds = history.len() as u32;
        AchievementState {
            score: history.iter().map(|c| c.points_added).sum(),
            round_count: rounds,
            accuracy: if rounds == 0 {
                0.0
            } else {
                correct as f64 / rounds as f64 * 100.0
            },
            all_correct: rounds > 0 && correct == rounds,
            history,
        }
    }

    #[test]
    fn names_match_serialized_form() {
        for a in Achievement::ALL {
            let json = serde_json::to_string(&a).unwrap();
            assert_eq!(json, format!("\"{}\"", a.name()));
        }
    }

    #[test]
    fn nothing_for_empty_state() {
        let h = history(&[]);
        assert!(evaluate(&state(&h)).is_empty());
    }

    #[test]
    fn score_thresholds() {
        let h = history(&[10]);
        assert_eq!(evaluate(&state(&h)), vec![Achievement::FirstPoints]);

        let h = history(&[50, 50]);
        let got = evaluate(&state(&h));
        assert!(got.contains(&Achievement::HalfCentury));
        assert!(got.contains(&Achievement::Century));
    }

    #[test]
    fn five_correct_in_a_row() {
        let h = history(&[10, 10, 10, 10, 10]);
        let got = evaluate(&state(&h));
        assert_eq!(
            got,
            vec![
                Achievement::FirstPoints,
                Achievement::HalfCentury,
                Achievement::PerfectStart,
                Achievement::HotStreak,
            ]
        );
    }

    #[test]
    fn streak_needs_the_last_five() {
        let h = history(&[10, 10, 10, 10, -5]);
        assert!(!evaluate(&state(&h)).contains(&Achievement::HotStreak));

        let h = history(&[-5, 10, 10, 10, 10, 10]);
        let got = evaluate(&state(&h));
        assert!(got.contains(&Achievement::HotStreak));
        assert!(!got.contains(&Achievement::PerfectStart));
    }

    #[test]
    fn zero_delta_breaks_a_streak() {
        let h = history(&[10, 10, 0, 10, 10]);
        let got = evaluate(&state(&h));
        assert!(!got.contains(&Achievement::HotStreak));
        assert!(!got.contains(&Achievement::PerfectStart));
    }

    #[test]
    fn sharp_shooter_at_ninety_percent() {
        let h = history(&[10, 10, 10, 10, 10, 10, 10, 10, 10, -5]);
        assert!(evaluate(&state(&h)).contains(&Achievement::SharpShooter));

        let h = history(&[10, 10, 10, 10, 10, 10, 10, 10, -5, -5]);
        assert!(!evaluate(&state(&h)).contains(&Achievement::SharpShooter));
    }

    #[test]
    fn newly_unlocked_skips_existing() {
        let h = history(&[10, 10, 10, 10, 10]);
        let s = state(&h);
        let first = newly_unlocked(&s, &[]);
        assert_eq!(first.len(), 4);
        assert!(newly_unlocked(&s, &first).is_empty());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let h = history(&[10, -5, 10, 10, 10, 10, 10, 10, 10, 10, 10]);
        let a = evaluate(&state(&h));
        let b = evaluate(&state(&h));
        assert_eq!(a, b);
        let mut dedup = a.clone();
        dedup.dedup();
        assert_eq!(a, dedup);
    }
}
