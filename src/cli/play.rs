//! Play command implementation.

use super::input::{HumanController, SharedInput, shared_stdin};
use super::output::{JsonGameResult, format_summary_text, format_turn};
use super::{CliError, ControllerKind, OutputFormat, load_settings, resolve_seed};
use gridhold::negotiator::{HttpSuggester, Negotiator};
use gridhold::render::render_state;
use gridhold::session::{Controller, NegotiatingController, RandomController, Session};
use gridhold::{GameState, Settings, SideId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::StdinLock;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

fn build_controller(
    kind: ControllerKind,
    side: SideId,
    settings: &Settings,
    stdin: &mut Option<SharedInput<StdinLock<'static>>>,
) -> Result<Box<dyn Controller>, CliError> {
    let name = format!("{kind:?}").to_lowercase();
    Ok(match kind {
        ControllerKind::Human => {
            let input = Rc::clone(stdin.get_or_insert_with(shared_stdin));
            Box::new(HumanController::stdio(name, input))
        }
        ControllerKind::Random => Box::new(RandomController),
        ControllerKind::Llm => {
            let suggester = HttpSuggester::new(settings.suggester.clone())
                .map_err(|e| CliError::new(format!("Failed to create client for side {side}: {e}")))?;
            info!(%side, ?suggester, "suggestion service configured");
            let negotiator = Negotiator::new(settings.negotiator, suggester);
            Box::new(NegotiatingController::new(name, negotiator))
        }
    })
}

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if the settings are unusable, a side abandons, or the
/// game state breaks an invariant.
pub(crate) fn execute(
    side_a: ControllerKind,
    side_b: ControllerKind,
    seed: Option<u64>,
    config: Option<PathBuf>,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    let seed = resolve_seed(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let state = GameState::generate(settings.game, &mut rng)?;
    let mut stdin = None;
    let a = build_controller(side_a, SideId::A, &settings, &mut stdin)?;
    let b = build_controller(side_b, SideId::B, &settings, &mut stdin)?;
    let mut session = Session::new(state, a, b, rng);

    let narrate = !quiet && format == OutputFormat::Text;
    if narrate {
        println!("Gridhold with seed {seed}");
        println!(
            "Side A (X): {}, side B (O): {}",
            session.controller_name(SideId::A),
            session.controller_name(SideId::B)
        );
        println!();
    }

    let names = [SideId::A, SideId::B].map(|side| session.controller_name(side).to_string());
    let summary = session.run_with(|_, report| {
        if narrate {
            println!("{}", format_turn(report, &names[report.side.index()]));
        }
    })?;

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!();
                print!("{}", render_state(session.state()));
                println!();
            }
            print!("{}", format_summary_text(&summary, seed));
        }
        OutputFormat::Json => {
            let result = JsonGameResult {
                seed,
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
