//! Game session tracking and per-round timing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::model::Difficulty;
use crate::store::{read_json, write_json};

/// Maximum number of finished sessions kept in `sessions.json`.
pub const MAX_SESSIONS: usize = 1000;

/// One play-through from start to quit or win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: String,
    pub player_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub final_score: i64,
    #[serde(default)]
    pub won: bool,
    pub mode: Difficulty,
}

impl GameSession {
    /// Time between start and end, or until now for an open session.
    pub fn duration(&self) -> Duration {
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - self.start_time).to_std().unwrap_or_default()
    }
}

/// Aggregate figures over all finished sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total_sessions: usize,
    pub won_sessions: usize,
    pub win_rate: f64,
    pub average_score: f64,
}

/// Open sessions in memory, finished sessions in `{data_dir}/sessions.json`.
pub struct SessionLog {
    path: Option<PathBuf>,
    active: HashMap<String, GameSession>,
}

impl SessionLog {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: Some(data_dir.join("sessions.json")),
            active: HashMap::new(),
        }
    }

    /// A log that tracks sessions but never writes them.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            active: HashMap::new(),
        }
    }

    /// Register a new session and return its identifier.
    pub fn start(&mut self, player_name: &str, mode: Difficulty) -> String {
        let session = GameSession {
            session_id: Uuid::new_v4().to_string(),
            player_name: player_name.to_string(),
            start_time: Utc::now(),
            end_time: None,
            final_score: 0,
            won: false,
            mode,
        };
        let id = session.session_id.clone();
        info!("started session {id} for {player_name} ({mode})");
        self.active.insert(id.clone(), session);
        id
    }

    /// Close a session and append it to the log file.
    pub fn end(&mut self, session_id: &str, final_score: i64, won: bool) -> Option<GameSession> {
        let Some(mut session) = self.active.remove(session_id) else {
            warn!("attempted to end unknown session {session_id}");
            return None;
        };
        session.end_time = Some(Utc::now());
        session.final_score = final_score;
        session.won = won;

        if let Err(e) = self.append(&session) {
            error!("failed to save session {session_id}: {e:#}");
        }
        info!(
            "ended session {session_id}: score {final_score}, won {won}, duration {:.1}s",
            session.duration().as_secs_f64()
        );
        Some(session)
    }

    /// Finished sessions, oldest first.
    pub fn load(&self) -> Vec<GameSession> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        match read_json::<Vec<GameSession>>(path) {
            Ok(sessions) => sessions.unwrap_or_default(),
            Err(e) => {
                warn!("ignoring unreadable session log: {e:#}");
                Vec::new()
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let sessions = self.load();
        let total = sessions.len();
        let won = sessions.iter().filter(|s| s.won).count();
        let score_sum: i64 = sessions.iter().map(|s| s.final_score).sum();
        SessionSummary {
            total_sessions: total,
            won_sessions: won,
            win_rate: won as f64 / total.max(1) as f64 * 100.0,
            average_score: score_sum as f64 / total.max(1) as f64,
        }
    }

    fn append(&self, session: &GameSession) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut sessions = self.load();
        sessions.push(session.clone());
        if sessions.len() > MAX_SESSIONS {
            sessions.drain(..sessions.len() - MAX_SESSIONS);
        }
        write_json(path, &sessions)
    }
}

/// Logs how long a round took when dropped.
///
/// A guard that is dropped without [`RoundGuard::complete`] having been
/// called reports the round as failed.
pub struct RoundGuard {
    round: u32,
    started: Instant,
    completed: bool,
}

impl RoundGuard {
    pub fn start(round: u32) -> Self {
        Self {
            round,
            started: Instant::now(),
            completed: false,
        }
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for RoundGuard {
    fn drop(&mut self) {
        let secs = self.elapsed().as_secs_f64();
        if self.completed {
            info!(round = self.round, "round completed in {secs:.2}s");
        } else {
            warn!(round = self.round, "round ended with error after {secs:.2}s");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn start_then_end_appends_to_file() {
        let dir = TempDir::new().unwrap();
        let mut log = SessionLog::open(dir.path());
        let id = log.start("Ada", Difficulty::Hard);
        let session = log.end(&id, 60, true).unwrap();

        assert!(session.end_time.is_some());
        assert_eq!(session.mode, Difficulty::Hard);
        let stored = SessionLog::open(dir.path()).load();
        assert_eq!(stored, vec![session]);
    }

    #[test]
    fn ending_unknown_session_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut log = SessionLog::open(dir.path());
        assert!(log.end("missing", 10, false).is_none());
        assert!(!dir.path().join("sessions.json").exists());
    }

    #[test]
    fn session_cannot_end_twice() {
        let dir = TempDir::new().unwrap();
        let mut log = SessionLog::open(dir.path());
        let id = log.start("Ada", Difficulty::Normal);
        assert!(log.end(&id, 10, false).is_some());
        assert!(log.end(&id, 10, false).is_none());
        assert_eq!(log.load().len(), 1);
    }

    #[test]
    fn log_is_capped() {
        let dir = TempDir::new().unwrap();
        let mut log = SessionLog::open(dir.path());
        let seed: Vec<GameSession> = (0..MAX_SESSIONS)
            .map(|i| GameSession {
                session_id: format!("old-{i}"),
                player_name: "Old".into(),
                start_time: Utc::now(),
                end_time: Some(Utc::now()),
                final_score: 0,
                won: false,
                mode: Difficulty::Easy,
            })
            .collect();
        write_json(&dir.path().join("sessions.json"), &seed).unwrap();

        let id = log.start("New", Difficulty::Normal);
        log.end(&id, 5, false);
        let stored = log.load();
        assert_eq!(stored.len(), MAX_SESSIONS);
        assert_eq!(stored[0].session_id, "old-1");
        assert_eq!(stored.last().unwrap().session_id, id);
    }

    #[test]
    fn summary_over_finished_sessions() {
        let dir = TempDir::new().unwrap();
        let mut log = SessionLog::open(dir.path());
        assert_eq!(log.summary().total_sessions, 0);
        assert_eq!(log.summary().win_rate, 0.0);

        for (score, won) in [(50, true), (20, false), (-10, false), (60, true)] {
            let id = log.start("Ada", Difficulty::Normal);
            log.end(&id, score, won);
        }
        let summary = log.summary();
        assert_eq!(summary.total_sessions, 4);
        assert_eq!(summary.won_sessions, 2);
        assert_eq!(summary.win_rate, 50.0);
        assert_eq!(summary.average_score, 30.0);
    }

    #[test]
    fn in_memory_log_tracks_without_writing() {
        let mut log = SessionLog::in_memory();
        let id = log.start("Ada", Difficulty::Easy);
        let session = log.end(&id, 15, false).unwrap();
        assert_eq!(session.final_score, 15);
        assert!(log.load().is_empty());
    }

    #[test]
    fn round_guard_tracks_completion() {
        let mut guard = RoundGuard::start(3);
        assert!(!guard.completed);
        guard.complete();
        assert!(guard.completed);
        assert!(guard.elapsed() < Duration::from_secs(5));
    }
}
