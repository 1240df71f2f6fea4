// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Gridhold: a two-sided territorial grid game with a language-model
//! opponent.
//!
//! The crate provides:
//! - A rules engine and move executor that never leave the game
//!   inconsistent
//! - A negotiator that turns free-text suggestions into legal actions
//! - A session loop driving human, random or suggester-backed sides
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Session (controllers, turn loop)  │
//! ├─────────────────────────────────────┤
//! │   Negotiator (suggester, retries)   │
//! ├─────────────────────────────────────┤
//! │   Game (rules, executor, state)     │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod negotiator;
pub mod parse;
pub mod render;
pub mod session;

pub use config::{GameConfig, NegotiatorConfig, Settings, SuggesterConfig};
pub use error::{ConfigError, CoordParseError, IllegalAction, InvariantViolation};

// Re-export key game types at crate root for convenience
pub use game::{Action, Board, Coord, GameState, Outcome, Side, SideId, SpecialItem};
pub use negotiator::{Decision, DecisionSource, Negotiator, Suggester};
pub use session::{Controller, GameSummary, Session, SessionError, TurnReport};
