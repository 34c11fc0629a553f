//! The `brainplay play` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use brainplay_core::config::{load_config_from, BrainPlayConfig};
use brainplay_core::history::{GameHistory, GameRecord, RoundRecord, RoundStatistics};
use brainplay_core::players::{PlayerProfile, PlayerRegistry};
use brainplay_core::sessions::{RoundGuard, SessionLog};
use brainplay_core::store::{JsonFileStore, MemoryStore, ScoreStore};
use brainplay_core::{Difficulty, QuestionFactory, ScoreManager};
use brainplay_facts::create_fact_lookup;

const DEFAULT_PLAYER: &str = "Anonymous";
const QUIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Command-line options for a game.
pub struct PlayOptions {
    pub mode: Option<Difficulty>,
    pub player: Option<String>,
    pub config: Option<PathBuf>,
    pub no_facts: bool,
    pub no_save: bool,
}

pub async fn execute(options: PlayOptions) -> Result<()> {
    let mut config = load_config_from(options.config.as_deref())?;
    if options.no_facts {
        config.facts.enabled = false;
    }

    let mut factory = QuestionFactory::with_weights(config.typed_weights()?)?;
    if let Some(lookup) = create_fact_lookup(&config.facts) {
        factory = factory.with_fact_lookup(lookup);
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut game = Game::setup(
        &config,
        factory,
        options.mode.unwrap_or(config.default_mode),
        options.player,
        !options.no_save,
        stdin.lock(),
        stdout.lock(),
    )?;
    game.run().await
}

/// How a round left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundOutcome {
    Continue,
    Won,
    Quit,
}

/// One interactive game, reading answers from `input` and writing prompts
/// and results to `output`.
pub struct Game<'a, R, W> {
    config: &'a BrainPlayConfig,
    factory: QuestionFactory,
    mode: Difficulty,
    player: PlayerProfile,
    scores: ScoreManager,
    registry: Option<PlayerRegistry>,
    history: Option<GameHistory>,
    sessions: SessionLog,
    session_id: String,
    rounds: Vec<RoundRecord>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Game<'a, R, W> {
    /// Resolve the player, restore their score state, and reset it for a new
    /// game. With `persist` off nothing is written to the data directory.
    pub fn setup(
        config: &'a BrainPlayConfig,
        factory: QuestionFactory,
        mode: Difficulty,
        player_name: Option<String>,
        persist: bool,
        mut input: R,
        mut output: W,
    ) -> Result<Self> {
        let name = match player_name {
            Some(name) => name,
            None => prompt(
                &mut input,
                &mut output,
                &format!("Enter your name (or press Enter for '{DEFAULT_PLAYER}'): "),
            )?
            .unwrap_or_default(),
        };
        let name = match name.trim() {
            "" => DEFAULT_PLAYER.to_string(),
            trimmed => trimmed.to_string(),
        };

        let mut registry = persist.then(|| PlayerRegistry::open(&config.data_dir));
        let player = match registry.as_mut() {
            Some(registry) => registry.get_or_create(&name),
            None => PlayerProfile::new(&name),
        };
        let store: Box<dyn ScoreStore> = if persist {
            Box::new(JsonFileStore::new(&config.data_dir))
        } else {
            Box::new(MemoryStore::new())
        };
        let (history, sessions) = if persist {
            (
                Some(GameHistory::open(&config.data_dir)),
                SessionLog::open(&config.data_dir),
            )
        } else {
            (None, SessionLog::in_memory())
        };
        info!(
            "player setup complete: {} ({} games played)",
            player.name, player.total_games
        );

        let mut scores = ScoreManager::new(player.player_id.clone(), store);
        scores.reset_score();

        Ok(Self {
            config,
            factory,
            mode,
            player,
            scores,
            registry,
            history,
            sessions,
            session_id: String::new(),
            rounds: Vec::new(),
            input,
            output,
        })
    }

    /// Play rounds until the player wins or quits, then wrap up the game.
    pub async fn run(&mut self) -> Result<()> {
        self.session_id = self.sessions.start(&self.player.name, self.mode);
        self.print_banner()?;

        let won = loop {
            match self.play_round().await? {
                RoundOutcome::Continue => continue,
                RoundOutcome::Won => break true,
                RoundOutcome::Quit => break false,
            }
        };

        self.finish(won)
    }

    fn print_banner(&mut self) -> Result<()> {
        let short_id: String = self.session_id.chars().take(8).collect();
        let rule = "=".repeat(40);
        writeln!(self.output, "Welcome to BrainPlay: Win or Lose!")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "Player: {}", self.player.name)?;
        writeln!(self.output, "Session ID: {short_id}...")?;
        writeln!(self.output, "Mode: {}", self.mode.to_string().to_uppercase())?;
        writeln!(
            self.output,
            "Your Stats: {} games, {} wins",
            self.player.total_games, self.player.total_wins
        )?;
        writeln!(self.output, "Starting Score: {}", self.scores.get_score())?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "Rules:")?;
        writeln!(self.output, "  +{} points for correct answers", self.config.correct_points)?;
        writeln!(self.output, "  {} points for wrong answers", self.config.wrong_points)?;
        writeln!(self.output, "  Reach {} points to WIN!", self.config.win_score)?;
        writeln!(self.output, "  Type 'quit' anytime to exit")?;
        writeln!(self.output, "{rule}")?;
        Ok(())
    }

    async fn play_round(&mut self) -> Result<RoundOutcome> {
        let round_number = self.rounds.len() as u32 + 1;
        let mut guard = RoundGuard::start(round_number);

        let question = self.factory.create_question(self.mode).await;
        debug!(
            "round {round_number}: {} question at {}",
            question.question_type(),
            question.difficulty()
        );
        writeln!(self.output, "\n{}", question.text())?;

        let answer = loop {
            let Some(line) = self.ask("Your answer: ")? else {
                info!("input closed, {} leaves the game", self.player.name);
                guard.complete();
                return Ok(RoundOutcome::Quit);
            };
            if line.is_empty() {
                warn!("empty answer from {}", self.player.name);
                writeln!(self.output, "Answer cannot be empty")?;
                continue;
            }
            if QUIT_COMMANDS.contains(&line.to_lowercase().as_str()) {
                info!("{} entered quit command: {line}", self.player.name);
                guard.complete();
                return Ok(RoundOutcome::Quit);
            }
            break line;
        };

        let is_correct = question.check_answer(&answer);
        let points = if is_correct {
            self.config.correct_points
        } else {
            self.config.wrong_points
        };
        let update = self.scores.add_points(points)?;

        self.rounds.push(RoundRecord {
            session_id: self.session_id.clone(),
            player_name: self.player.name.clone(),
            round_number,
            question_type: question.question_type(),
            question_text: question.text().to_string(),
            correct_answer: question.answer().to_string(),
            user_answer: answer,
            is_correct,
            points_earned: points,
            total_score: update.new_score,
            timestamp: Utc::now(),
            difficulty: question.difficulty(),
        });
        info!(
            "round {round_number} completed: {} correct={is_correct} points={points:+} total={}",
            self.player.name, update.new_score
        );

        if is_correct {
            writeln!(self.output, "Correct!")?;
        } else {
            writeln!(self.output, "Wrong! Answer was {}", question.answer())?;
        }
        writeln!(
            self.output,
            "Points: {points:+} | Total Score: {}",
            update.new_score
        )?;
        for achievement in &update.unlocked {
            writeln!(self.output, "Achievement unlocked: {achievement}")?;
        }

        if update.new_score >= self.config.win_score {
            writeln!(
                self.output,
                "\nWINNER! You've reached {} points!",
                self.config.win_score
            )?;
            info!("{} won with {}", self.player.name, update.new_score);
            guard.complete();
            return Ok(RoundOutcome::Won);
        }

        let outcome = match self.ask("\nContinue playing? (y/n): ")? {
            Some(choice) if matches!(choice.to_lowercase().as_str(), "" | "y" | "yes") => {
                RoundOutcome::Continue
            }
            _ => {
                info!("{} chose not to continue", self.player.name);
                RoundOutcome::Quit
            }
        };
        guard.complete();
        Ok(outcome)
    }

    fn finish(&mut self, won: bool) -> Result<()> {
        let final_score = self.scores.get_score();
        let session = self.sessions.end(&self.session_id, final_score, won);

        if let Some(registry) = self.registry.as_mut() {
            if let Some(updated) = registry.record_game(&self.player.player_id, final_score, won) {
                self.player = updated.clone();
            }
        } else {
            self.player.total_games += 1;
            self.player.total_wins += u32::from(won);
            self.player.best_score = self.player.best_score.max(final_score);
            self.player.last_played = Utc::now();
        }

        if won {
            writeln!(self.output, "\nWINNER! Final Score: {final_score}")?;
        } else {
            writeln!(self.output, "\nThanks for playing! Final Score: {final_score}")?;
        }
        info!(
            "game over for {}: won={won} score={final_score} session={}",
            self.player.name, self.session_id
        );

        if let Some(history) = &self.history {
            let record = GameRecord {
                session_id: self.session_id.clone(),
                player_name: self.player.name.clone(),
                mode: self.mode,
                final_score,
                won,
                statistics: RoundStatistics::from_rounds(&self.rounds),
                rounds: self.rounds.clone(),
                session_duration_secs: session
                    .map(|s| s.duration().as_secs_f64())
                    .unwrap_or_default(),
                timestamp: Utc::now(),
                game: Some(self.scores.statistics()),
            };
            match history.append(record) {
                Ok(()) => writeln!(self.output, "Game data saved successfully!")?,
                Err(e) => {
                    error!("failed to save game history: {e:#}");
                    writeln!(self.output, "Failed to save game data")?;
                }
            }
        }

        self.print_statistics()?;
        self.offer_reset()
    }

    fn print_statistics(&mut self) -> Result<()> {
        if !self.rounds.is_empty() {
            let stats = RoundStatistics::from_rounds(&self.rounds);
            writeln!(self.output, "\nGame Statistics:")?;
            writeln!(self.output, "Total Rounds: {}", stats.total_rounds)?;
            writeln!(self.output, "Correct Answers: {}", stats.correct_answers)?;
            writeln!(self.output, "Wrong Answers: {}", stats.wrong_answers)?;
            writeln!(self.output, "Accuracy: {:.1}%", stats.accuracy)?;
            writeln!(self.output, "Total Points Earned: {}", stats.total_points)?;
            writeln!(self.output, "Game Duration: {}", self.scores.game_duration())?;
            let achievements = self.scores.achievements();
            if !achievements.is_empty() {
                let names: Vec<_> = achievements.iter().map(|a| a.name()).collect();
                writeln!(self.output, "Achievements: {}", names.join(", "))?;
            }
        }

        writeln!(self.output, "\nPlayer Profile:")?;
        writeln!(self.output, "Name: {}", self.player.name)?;
        writeln!(self.output, "Total Games: {}", self.player.total_games)?;
        writeln!(self.output, "Total Wins: {}", self.player.total_wins)?;
        writeln!(self.output, "Best Score: {}", self.player.best_score)?;
        writeln!(self.output, "Win Rate: {:.1}%", self.player.win_rate())?;
        Ok(())
    }

    fn offer_reset(&mut self) -> Result<()> {
        let final_score = self.scores.get_score();
        writeln!(self.output, "\n{}", "=".repeat(50))?;
        writeln!(self.output, "SCORE MANAGEMENT")?;
        writeln!(self.output, "{}", "=".repeat(50))?;
        writeln!(self.output, "Your current saved score: {final_score}")?;
        writeln!(self.output, "Would you like to reset your score to 0 for future games?")?;

        let reset = loop {
            match self.ask("Reset score to 0? (y/n): ")? {
                None => break false,
                Some(choice) => match choice.to_lowercase().as_str() {
                    "y" | "yes" => break true,
                    "n" | "no" => break false,
                    _ => writeln!(self.output, "Please enter 'y' for yes or 'n' for no.")?,
                },
            }
        };

        if reset {
            self.scores.reset_score();
            writeln!(self.output, "\nScore reset successfully!")?;
            writeln!(
                self.output,
                "Previous score: {final_score} -> New score: {}",
                self.scores.get_score()
            )?;
        } else {
            writeln!(self.output, "\nScore kept at {final_score} for your next game.")?;
        }
        Ok(())
    }

    fn ask(&mut self, text: &str) -> Result<Option<String>> {
        prompt(&mut self.input, &mut self.output, text)
    }
}

/// Write `text`, then read one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
