//! Durable storage for per-player score state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::achievements::Achievement;
use crate::score::ScoreChange;

/// The persisted shape of one player's score state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub player_id: String,
    pub score: i64,
    pub round_count: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub game_start_time: DateTime<Utc>,
    pub score_history: Vec<ScoreChange>,
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ScoreSnapshot {
    /// Whether the counters and the score agree with the recorded history.
    pub fn is_consistent(&self) -> bool {
        let history_total = self
            .score_history
            .iter()
            .try_fold(0i64, |acc, change| acc.checked_add(change.points_added));
        self.round_count as usize == self.score_history.len()
            && self.correct_answers.checked_add(self.wrong_answers) == Some(self.round_count)
            && history_total == Some(self.score)
    }
}

/// Backing store for score snapshots, keyed by player identifier.
pub trait ScoreStore: Send + Sync {
    /// Load the snapshot stored for `player_id`. A missing entry is `Ok(None)`.
    fn load(&self, player_id: &str) -> Result<Option<ScoreSnapshot>>;

    /// Overwrite the stored snapshot for `snapshot.player_id`.
    fn save(&self, snapshot: &ScoreSnapshot) -> Result<()>;
}

/// One pretty-printed JSON file per player: `{dir}/score_{player_id}.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `player_id`'s state.
    pub fn path_for(&self, player_id: &str) -> PathBuf {
        self.dir.join(format!("score_{player_id}.json"))
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self, player_id: &str) -> Result<Option<ScoreSnapshot>> {
        read_json(&self.path_for(player_id))
    }

    fn save(&self, snapshot: &ScoreSnapshot) -> Result<()> {
        write_json(&self.path_for(&snapshot.player_id), snapshot)
    }
}

/// Read and parse a JSON file. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

/// Overwrite `path` with pretty JSON, creating parent directories.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, ScoreSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot under an explicit key, regardless of its player id.
    pub fn insert(&self, key: &str, snapshot: ScoreSnapshot) {
        self.lock().insert(key.to_string(), snapshot);
    }

    pub fn get(&self, key: &str) -> Option<ScoreSnapshot> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ScoreSnapshot>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self, player_id: &str) -> Result<Option<ScoreSnapshot>> {
        Ok(self.get(player_id))
    }

    fn save(&self, snapshot: &ScoreSnapshot) -> Result<()> {
        self.insert(&snapshot.player_id, snapshot.clone());
        Ok(())
    }
}
