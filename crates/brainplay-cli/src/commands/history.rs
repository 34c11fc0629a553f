//! The `brainplay history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use brainplay_core::config::load_config_from;
use brainplay_core::history::GameHistory;
use brainplay_core::sessions::SessionLog;

pub fn execute(limit: usize, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let games = GameHistory::open(&config.data_dir).recent(limit);

    if games.is_empty() {
        println!("No game history found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Player", "Mode", "Score", "Result", "Rounds", "Accuracy", "Session",
    ]);

    for game in &games {
        let short_id: String = game.session_id.chars().take(8).collect();
        table.add_row(vec![
            Cell::new(game.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(&game.player_name),
            Cell::new(game.mode),
            Cell::new(game.final_score),
            Cell::new(if game.won { "won" } else { "lost" }),
            Cell::new(game.rounds.len()),
            Cell::new(format!("{:.1}%", game.statistics.accuracy)),
            Cell::new(format!("{short_id}...")),
        ]);
    }

    println!("Game History (last {}):", games.len());
    println!("{table}");

    let summary = SessionLog::open(&config.data_dir).summary();
    if summary.total_sessions > 0 {
        println!(
            "\n{} sessions, {} won ({:.1}%), average score {:.1}",
            summary.total_sessions, summary.won_sessions, summary.win_rate, summary.average_score
        );
    }

    Ok(())
}
