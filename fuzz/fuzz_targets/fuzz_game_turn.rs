#![no_main]

//! Full game turn fuzzer.
//!
//! Drives a game with arbitrary (often illegal) actions and arbitrary dice:
//! 1. Validate the action against the rules
//! 2. Apply it, checking rejection leaves the state untouched
//! 3. Settle the MagicWell bonus
//! 4. Check invariants after every turn
//!
//! This catches disagreements between validation and the executor that
//! the scripted scenarios miss.

use arbitrary::Arbitrary;
use gridhold::game::{
    Action, ActionKind, Coord, GameState, ScriptedDice, SpecialItem, check_invariants,
};
use gridhold::GameConfig;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A fuzzer-generated action.
#[derive(Arbitrary, Debug, Clone, Copy)]
struct FuzzAction {
    kind: u8,
    row: u8,
    col: u8,
    well_row: u8,
    well_col: u8,
}

/// Structured input for full game turn fuzzing.
#[derive(Arbitrary, Debug)]
struct GameTurnInput {
    /// Grid side length, reduced into the supported range.
    size: u8,
    /// Items placed before the first turn.
    items: Vec<(u8, u8, u8)>,
    /// Actions, alternating between the sides.
    actions: Vec<FuzzAction>,
    /// Die faces consumed in order.
    rolls: Vec<u8>,
    /// Seed for the MagicWell draw.
    rng_seed: u64,
}

fuzz_target!(|input: GameTurnInput| {
    let size = input.size % 8 + 2;
    let config = GameConfig {
        grid_size: size,
        victory_threshold: u16::from(size) * u16::from(size) / 2 + 1,
        ..GameConfig::default()
    };
    let Ok(mut state) = GameState::new(config) else {
        return;
    };

    for &(row, col, item) in input.items.iter().take(16) {
        let coord = Coord::new(row % size, col % size);
        let item = match item % 3 {
            0 => SpecialItem::PowerSource,
            1 => SpecialItem::MagicWell,
            _ => SpecialItem::Shield,
        };
        if state.board.owner(coord).is_none() {
            state.board.place_special(coord, item);
        }
    }

    let mut dice = ScriptedDice::new(input.rolls.iter().copied());
    let mut rng = ChaCha8Rng::seed_from_u64(input.rng_seed);

    for (turn, fuzz) in input.actions.iter().take(64).enumerate() {
        if state.winner().is_some() {
            break;
        }
        let side = state.to_move;
        state.begin_turn(side);

        let kind = ActionKind::ALL[usize::from(fuzz.kind) % ActionKind::ALL.len()];
        let action = Action::new(kind, Coord::new(fuzz.row % (size + 1), fuzz.col % (size + 1)));
        let legal = state.legal_moves(side);
        let valid = state.validate(side, action).is_ok();
        assert_eq!(legal.contains(&action), valid, "{action} listed/valid mismatch");

        let territory = [state.sides[0].territory(), state.sides[1].territory()];
        match state.apply(side, action, &mut dice) {
            Ok(_) => assert!(valid, "{action} applied but failed validation"),
            Err(_) => {
                assert!(!valid, "{action} validated but was rejected");
                assert_eq!(
                    territory,
                    [state.sides[0].territory(), state.sides[1].territory()]
                );
            }
        }

        let nominated = Coord::new(fuzz.well_row % size, fuzz.well_col % size);
        state.settle_well_bonus(side, Some(nominated), &mut rng);

        let violations = check_invariants(&state);
        assert!(
            violations.is_empty(),
            "Invariants violated after turn {turn}: {violations:?}"
        );

        state.end_turn();
    }
});
