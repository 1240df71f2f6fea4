//! Benchmarks for the rules engine, executor and reply parser.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use gridhold::game::{Action, ActionKind, Coord, GameState, RngDice, SideId};
use gridhold::parse::parse_reply;
use gridhold::GameConfig;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// A mid-game position reached by random play.
fn midgame(seed: u64) -> GameState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = GameState::generate(GameConfig::default(), &mut rng).unwrap();
    for _ in 0..16 {
        let side = state.to_move;
        state.begin_turn(side);
        if let Some(&action) = state.legal_moves(side).choose(&mut rng) {
            state.apply(side, action, &mut RngDice(&mut rng)).unwrap();
        }
        state.end_turn();
    }
    state
}

fn bench_legal_moves(c: &mut Criterion) {
    let state = midgame(42);
    c.bench_function("legal_moves", |b| {
        b.iter(|| black_box(state.legal_moves(black_box(SideId::A))));
    });
}

fn bench_validate_all(c: &mut Criterion) {
    let state = midgame(42);
    let size = state.board.size();
    c.bench_function("validate_every_action", |b| {
        b.iter(|| {
            let mut legal = 0u32;
            for row in 0..size {
                for col in 0..size {
                    for kind in ActionKind::ALL {
                        let action = Action::new(kind, Coord::new(row, col));
                        if state.validate(SideId::B, black_box(action)).is_ok() {
                            legal += 1;
                        }
                    }
                }
            }
            black_box(legal)
        });
    });
}

fn bench_apply(c: &mut Criterion) {
    let state = midgame(7);
    let moves = state.legal_moves(state.to_move);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    c.bench_function("apply_each_legal_move", |b| {
        b.iter(|| {
            for &action in &moves {
                let mut next = state.clone();
                let outcome = next.apply(next.to_move, action, &mut RngDice(&mut rng));
                let _ = black_box(outcome);
            }
        });
    });
}

fn bench_parse_reply(c: &mut Criterion) {
    let reply = "I'll push toward the center.\nATTACK: C3\nWELL_TARGET: B2\n";
    c.bench_function("parse_reply", |b| {
        b.iter(|| black_box(parse_reply(black_box(reply), 5)));
    });
}

criterion_group!(benches, bench_legal_moves, bench_validate_all, bench_apply, bench_parse_reply);
criterion_main!(benches);
