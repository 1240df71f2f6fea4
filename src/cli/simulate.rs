//! Simulate command implementation.

use super::output::{JsonSimulationResult, SimulationStats, format_simulation_text};
use super::{CliError, OutputFormat, load_settings, resolve_seed};
use gridhold::session::{GameSummary, RandomController, Session, SessionError};
use gridhold::{GameConfig, GameState};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Play one random-vs-random game from `seed`.
fn play_one(config: GameConfig, seed: u64) -> Result<GameSummary, SessionError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let state = GameState::generate(config, &mut rng)?;
    Session::new(
        state,
        Box::new(RandomController),
        Box::new(RandomController),
        rng,
    )
    .run()
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the settings are unusable or output fails.
pub(crate) fn execute(
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    config: Option<PathBuf>,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    settings.game.validate()?;
    let config = settings.game;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = resolve_seed(seed);

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each worker folds into its own stats; the partial results are merged
    // at the end.
    let stats = (0..games)
        .into_par_iter()
        .fold(SimulationStats::default, |mut local, i| {
            let game_seed = base_seed.wrapping_add(i);
            match play_one(config, game_seed) {
                Ok(summary) => local.add_summary(&summary),
                Err(e) => {
                    warn!(seed = game_seed, error = %e, "simulated game failed");
                    local.add_error();
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(SimulationStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_simulation_text(&stats));
            println!();
            println!("Base seed: {base_seed}");
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let result = JsonSimulationResult::from_stats(&stats);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
