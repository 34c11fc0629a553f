//! brainplay CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use brainplay_core::Difficulty;

mod commands;

#[derive(Parser)]
#[command(name = "brainplay", version, about = "A squares and square roots quiz: win or lose")]
struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play {
        /// Difficulty: easy, normal, hard
        #[arg(long, short)]
        mode: Option<Difficulty>,

        /// Player name (prompted for when omitted)
        #[arg(long, short)]
        player: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip number trivia hints
        #[arg(long)]
        no_facts: bool,

        /// Keep all state in memory
        #[arg(long)]
        no_save: bool,
    },

    /// Show the last games played
    History {
        /// Number of games to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show statistics for every player
    Stats {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Reset a player's saved score
    Reset {
        /// Player name
        #[arg(long, short)]
        player: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for target in ["brainplay", "brainplay_core", "brainplay_facts"] {
        filter = filter.add_directive(format!("{target}={level}").parse().unwrap());
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let result = match cli.command {
        Commands::Play {
            mode,
            player,
            config,
            no_facts,
            no_save,
        } => {
            commands::play::execute(commands::play::PlayOptions {
                mode,
                player,
                config,
                no_facts,
                no_save,
            })
            .await
        }
        Commands::History { limit, config } => commands::history::execute(limit, config),
        Commands::Stats { config } => commands::stats::execute(config),
        Commands::Reset { player, config } => commands::reset::execute(player, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
