use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, Metadata, Record, debug, info};
use triple_solitaire::{
    AutoPlayMode, Board, Config, Engine, Observer, Snapshot,
    script::{parse_script, run_script},
};

use std::io::{Read, stdin};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine activity to stderr; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly dealt game
    Deal {
        /// Seed of the shuffle, random if omitted
        #[arg(long, value_name = "NUM")]
        seed: Option<u64>,
    },
    /// Play a script of moves through the engine
    Play {
        /// Seed of the shuffle, random if omitted
        #[arg(long, value_name = "NUM", conflicts_with = "load")]
        seed: Option<u64>,
        /// Continue a game saved with --save
        #[arg(long, value_name = "FILE")]
        load: Option<PathBuf>,
        /// When the engine moves cards to the foundations by itself
        #[arg(long, value_enum, value_name = "MODE")]
        auto_play: Option<AutoPlayMode>,
        /// Leave face-down lane cards for the script to flip
        #[arg(long)]
        no_auto_flip: bool,
        /// Save the game as JSON when the script ends
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
        /// Script file, read from stdin if omitted
        script: Option<PathBuf>,
    },
    /// Print a saved game
    Show {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Deal { seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            println!("Seed: {seed}\n");
            println!("{}", Board::new_from_seed(seed).pretty_print());
        }
        Commands::Play {
            seed,
            load,
            auto_play,
            no_auto_flip,
            save,
            script,
        } => {
            let config = Config {
                auto_flip: !no_auto_flip,
                auto_play: auto_play.unwrap_or_default(),
                ..Default::default()
            };
            let mut engine = Engine::new(config, CliObserver::default());
            match &load {
                Some(path) => {
                    engine.restore_snapshot(&load_snapshot(path)?)?;
                    engine.resume();
                }
                None => {
                    let seed = seed.unwrap_or_else(rand::random);
                    println!("Seed: {seed}\n");
                    engine.new_game_with_seed(seed);
                }
            }

            let text = match &script {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read script '{}'", path.display()))?,
                None => {
                    let mut text = String::new();
                    stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read script from stdin")?;
                    text
                }
            };
            let commands = parse_script(&text)?;
            let outcome = run_script(&mut engine, &commands);
            print_game(&engine);

            if let Some(path) = &save {
                let json = engine.save_snapshot().to_json()?;
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to save game to '{}'", path.display()))?;
                info!("Saved game to {}", path.display());
            }
            outcome?;
        }
        Commands::Show { file } => {
            let mut engine = Engine::with_defaults();
            engine.restore_snapshot(&load_snapshot(&file)?)?;
            print_game(&engine);
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read saved game '{}'", path.display()))?;
    Snapshot::from_json(&json)
}

fn print_game<O: Observer>(engine: &Engine<O>) {
    let board = engine.board().pretty_print();
    let moves = engine.move_count();
    let elapsed = format_elapsed(engine.elapsed_seconds());
    let status = if engine.is_won() { "✓ Won" } else { "Unfinished" };
    println!("{board}\n\n{status}. Moves: {moves}, Time: {elapsed}");
}

fn format_elapsed(secs: u32) -> String {
    if secs < 90 {
        format!("{secs}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}

#[derive(Default)]
struct CliObserver;

impl Observer for CliObserver {
    fn game_started(&mut self) {
        debug!("First move made, clock started");
    }

    fn signal_win(&mut self, elapsed_seconds: u32, move_count: u32) {
        info!(
            "You won in {move_count} moves, {}",
            format_elapsed(elapsed_seconds)
        );
    }
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
