//! The `brainplay reset` command.

use std::path::PathBuf;

use anyhow::Result;

use brainplay_core::config::load_config_from;
use brainplay_core::players::PlayerRegistry;
use brainplay_core::store::JsonFileStore;
use brainplay_core::ScoreManager;

pub fn execute(player: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = PlayerRegistry::open(&config.data_dir);

    let Some(profile) = registry.find(&player) else {
        anyhow::bail!("no player named '{player}'");
    };

    let store = JsonFileStore::new(&config.data_dir);
    let mut scores = ScoreManager::new(profile.player_id.clone(), Box::new(store));
    let old_score = scores.get_score();
    scores.reset_score();

    println!("Score reset for {}: {old_score} -> 0", profile.name);
    Ok(())
}
