//! Game layer for Gridhold.
//!
//! Implements the rules on a small square grid:
//! - Board with ownership marks and a sparse special-item overlay
//! - Per-side territory ledgers
//! - Rules engine (adjacency, dice, legal moves, win check)
//! - Move executor (expand, fortify, attack)
//! - Setup and invariant checks

mod action;
mod board;
mod executor;
mod invariants;
mod rules;
mod setup;
mod side;
mod state;

pub use action::{Action, ActionKind};
pub use board::{Board, CellMark, Coord, SpecialItem};
pub use executor::{Outcome, Roll};
pub use invariants::check_invariants;
pub use rules::{Dice, RngDice, Rules, ScriptedDice};
pub use setup::scatter_specials;
pub use side::{Side, SideId};
pub use state::{GameState, WellBonus};
