//! The `brainplay stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use brainplay_core::config::load_config_from;
use brainplay_core::players::PlayerRegistry;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let registry = PlayerRegistry::open(&config.data_dir);

    if registry.is_empty() {
        println!("No player statistics found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Player",
        "Games",
        "Wins",
        "Best Score",
        "Win Rate",
        "Last Played",
    ]);

    for player in registry.all() {
        table.add_row(vec![
            Cell::new(&player.name),
            Cell::new(player.total_games),
            Cell::new(player.total_wins),
            Cell::new(player.best_score),
            Cell::new(format!("{:.1}%", player.win_rate())),
            Cell::new(player.last_played.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("Player Statistics:");
    println!("{table}");
    Ok(())
}
