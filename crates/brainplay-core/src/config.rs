//! Game configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{Difficulty, QuestionType};

/// Upper bound on how long a fact lookup may delay a question.
pub const MAX_FACT_TIMEOUT_MS: u64 = 2000;

/// Largest magnitude allowed for `correct_points`, `wrong_points`, and
/// `win_score`.
pub const MAX_POINTS: i64 = 1_000_000;

/// Fact enrichment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactsConfig {
    /// Whether square questions get a trivia hint.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the numbers trivia service.
    #[serde(default = "default_facts_url")]
    pub base_url: String,
    /// Request timeout in milliseconds, capped at [`MAX_FACT_TIMEOUT_MS`].
    #[serde(default = "default_facts_timeout")]
    pub timeout_ms: u64,
    /// Facts longer than this many characters are cut and end in "...".
    #[serde(default = "default_facts_max_len")]
    pub max_len: usize,
}

impl FactsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.min(MAX_FACT_TIMEOUT_MS))
    }
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_facts_url(),
            timeout_ms: default_facts_timeout(),
            max_len: default_facts_max_len(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_facts_url() -> String {
    "http://numbersapi.com".to_string()
}
fn default_facts_timeout() -> u64 {
    MAX_FACT_TIMEOUT_MS
}
fn default_facts_max_len() -> usize {
    100
}

/// Top-level brainplay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainPlayConfig {
    /// Directory holding score, player, session, and history files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Difficulty used when none is given on the command line.
    #[serde(default)]
    pub default_mode: Difficulty,
    /// Score at which the player wins.
    #[serde(default = "default_win_score")]
    pub win_score: i64,
    /// Points for a correct answer.
    #[serde(default = "default_correct_points")]
    pub correct_points: i64,
    /// Points for a wrong answer.
    #[serde(default = "default_wrong_points")]
    pub wrong_points: i64,
    /// Relative selection weight per question type name.
    #[serde(default = "default_weights")]
    pub question_weights: HashMap<String, f64>,
    #[serde(default)]
    pub facts: FactsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_win_score() -> i64 {
    50
}
fn default_correct_points() -> i64 {
    10
}
fn default_wrong_points() -> i64 {
    -5
}
fn default_weights() -> HashMap<String, f64> {
    QuestionType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), 0.5))
        .collect()
}

impl Default for BrainPlayConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_mode: Difficulty::default(),
            win_score: default_win_score(),
            correct_points: default_correct_points(),
            wrong_points: default_wrong_points(),
            question_weights: default_weights(),
            facts: FactsConfig::default(),
        }
    }
}

impl BrainPlayConfig {
    /// Question weights keyed by type. Unknown type names are an error.
    pub fn typed_weights(&self) -> Result<HashMap<QuestionType, f64>, QuizError> {
        self.question_weights
            .iter()
            .map(|(name, &w)| name.parse::<QuestionType>().map(|t| (t, w)))
            .collect()
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the well-known paths.
///
/// Search order without a path:
/// 1. `brainplay.toml` in the current directory
/// 2. `~/.config/brainplay/config.toml`
///
/// Environment variable overrides: `BRAINPLAY_DATA_DIR`, `BRAINPLAY_FACTS_URL`.
pub fn load_config_from(path: Option<&Path>) -> Result<BrainPlayConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("brainplay.toml");
        if local.exists() {
            Some(local)
        } else {
            config_home()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BrainPlayConfig::default(),
    };

    if let Ok(dir) = std::env::var("BRAINPLAY_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Ok(url) = std::env::var("BRAINPLAY_FACTS_URL") {
        config.facts.base_url = url;
    }

    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));
    config.facts.base_url = resolve_env_vars(&config.facts.base_url);

    Ok(config)
}

/// Parse and validate a TOML config string.
pub fn parse_config_str(content: &str) -> Result<BrainPlayConfig> {
    let config: BrainPlayConfig = toml::from_str(content)?;
    config.typed_weights()?;
    anyhow::ensure!(
        (1..=MAX_POINTS).contains(&config.correct_points),
        "correct_points must be between 1 and {MAX_POINTS}, got {}",
        config.correct_points
    );
    anyhow::ensure!(
        (-MAX_POINTS..=0).contains(&config.wrong_points),
        "wrong_points must be between -{MAX_POINTS} and 0, got {}",
        config.wrong_points
    );
    anyhow::ensure!(
        (-MAX_POINTS..=MAX_POINTS).contains(&config.win_score),
        "win_score must be within {MAX_POINTS} of zero, got {}",
        config.win_score
    );
    Ok(config)
}

fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("brainplay"))
}
