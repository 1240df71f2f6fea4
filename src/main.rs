//! Gridhold CLI - play and simulate Gridhold games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gridhold - a territorial grid game with a language-model opponent
#[derive(Parser, Debug)]
#[command(name = "gridhold")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a single game
    Play {
        /// Controller for side A (X)
        #[arg(short = 'a', long = "a", default_value = "human")]
        side_a: cli::ControllerKind,

        /// Controller for side B (O)
        #[arg(short = 'b', long = "b", default_value = "llm")]
        side_b: cli::ControllerKind,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many random-vs-random games in parallel and aggregate results
    Simulate {
        /// Number of games to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// JSON settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Print the effective settings as JSON
    Rules {
        /// JSON settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Play {
            side_a,
            side_b,
            seed,
            config,
            format,
            quiet,
        } => cli::play::execute(side_a, side_b, seed, config, format, quiet),

        Commands::Simulate {
            games,
            seed,
            threads,
            config,
            format,
            progress,
        } => cli::simulate::execute(games, seed, threads, config, format, progress),

        Commands::Rules { config } => cli::rules(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
