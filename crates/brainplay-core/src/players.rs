//! Player profiles and the on-disk player registry.
//!
//! The registry hands out stable player identifiers and owns the
//! cross-game statistics (games played, wins, best score). Score state itself
//! lives in the [`ScoreManager`](crate::score::ScoreManager).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::store::{read_json, write_json};

/// Long-lived statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub player_id: String,
    #[serde(default)]
    pub total_games: u32,
    #[serde(default)]
    pub total_wins: u32,
    #[serde(default)]
    pub best_score: i64,
    pub created_date: DateTime<Utc>,
    pub last_played: DateTime<Utc>,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            player_id: Uuid::new_v4().to_string(),
            total_games: 0,
            total_wins: 0,
            best_score: 0,
            created_date: now,
            last_played: now,
        }
    }

    /// Percentage of games won.
    pub fn win_rate(&self) -> f64 {
        self.total_wins as f64 / self.total_games.max(1) as f64 * 100.0
    }
}

/// Player profiles persisted in `{data_dir}/players.json`.
pub struct PlayerRegistry {
    path: PathBuf,
    players: HashMap<String, PlayerProfile>,
    writable: bool,
}

impl PlayerRegistry {
    /// Open the registry.
    ///
    /// An unreadable file is renamed to `players.json.corrupt` and the
    /// registry starts empty. If the rename fails the registry stays
    /// read-only so the original file is never overwritten.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join("players.json");
        let (players, writable) = match read_json::<HashMap<String, PlayerProfile>>(&path) {
            Ok(players) => (players.unwrap_or_default(), true),
            Err(e) => {
                error!("failed to load player profiles: {e:#}");
                (HashMap::new(), set_aside(&path, &Self::corrupt_path(data_dir)))
            }
        };
        debug!("loaded {} player profiles", players.len());
        Self {
            path,
            players,
            writable,
        }
    }

    /// Path of the file moved aside when the registry cannot be read.
    fn corrupt_path(data_dir: &Path) -> PathBuf {
        data_dir.join("players.json.corrupt")
    }

    /// Find a player by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&PlayerProfile> {
        let wanted = name.to_lowercase();
        self.players
            .values()
            .find(|p| p.name.to_lowercase() == wanted)
    }

    /// Return the player with this name, creating and saving a new profile
    /// if none exists.
    pub fn get_or_create(&mut self, name: &str) -> PlayerProfile {
        if let Some(existing) = self.find(name) {
            info!("found existing player: {}", existing.name);
            return existing.clone();
        }

        let player = PlayerProfile::new(name);
        info!("created new player: {} (ID: {})", player.name, player.player_id);
        self.players.insert(player.player_id.clone(), player.clone());
        self.save_logged();
        player
    }

    /// Record a finished game for `player_id`.
    pub fn record_game(&mut self, player_id: &str, final_score: i64, won: bool) -> Option<&PlayerProfile> {
        let player = self.players.get_mut(player_id)?;
        player.total_games += 1;
        if won {
            player.total_wins += 1;
        }
        player.best_score = player.best_score.max(final_score);
        player.last_played = Utc::now();
        self.save_logged();
        self.players.get(player_id)
    }

    /// All profiles, most recently played first.
    pub fn all(&self) -> Vec<&PlayerProfile> {
        let mut players: Vec<_> = self.players.values().collect();
        players.sort_by(|a, b| b.last_played.cmp(&a.last_played));
        players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        anyhow::ensure!(
            self.writable,
            "refusing to overwrite unreadable {}",
            self.path.display()
        );
        write_json(&self.path, &self.players)
    }

    fn save_logged(&self) {
        if let Err(e) = self.save() {
            error!("failed to save player profiles: {e:#}");
        }
    }
}

fn set_aside(path: &Path, backup: &Path) -> bool {
    match std::fs::rename(path, backup) {
        Ok(()) => {
            warn!("moved unreadable player profiles to {}", backup.display());
            true
        }
        Err(e) => {
            error!("failed to move aside {}: {e}", path.display());
            false
        }
    }
}
