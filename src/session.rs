//! Turn loop.
//!
//! A [`Session`] owns the game state, one [`Controller`] per side and the
//! random generator every draw comes from. Each turn it asks the acting
//! side's controller for an action, re-solicits on rejection, applies the
//! action, settles the MagicWell bonus and checks invariants.

use std::fmt;

use rand::RngCore;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::{ConfigError, IllegalAction, InvariantViolation};
use crate::game::{
    Action, Coord, GameState, Outcome, RngDice, SideId, WellBonus, check_invariants,
};
use crate::negotiator::{NegotiationStats, Negotiator, Suggester};

/// Errors that end a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A controller gave up, e.g. a human quit at the prompt.
    #[error("side {0} abandoned the game")]
    Abandoned(SideId),
    /// The state broke an invariant.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
    /// The configuration cannot describe a game.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Reading controller input failed.
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
}

/// Something that picks actions for one side.
pub trait Controller {
    /// Display name.
    fn name(&self) -> &str;

    /// Pick an action for `side`. `Ok(None)` passes the choice to a random
    /// legal move.
    ///
    /// # Errors
    ///
    /// Returns an error to abandon the session.
    fn choose_action(
        &mut self,
        state: &GameState,
        side: SideId,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Action>, SessionError>;

    /// The last action was rejected by the executor.
    fn rejected(&mut self, _action: Action, _reason: &IllegalAction) {}

    /// Nominate a cell for the MagicWell bonus. Called only when `side`
    /// holds a MagicWell after its action.
    ///
    /// # Errors
    ///
    /// Returns an error to abandon the session.
    fn choose_well_target(
        &mut self,
        _state: &GameState,
        _side: SideId,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<Coord>, SessionError> {
        Ok(None)
    }

    /// Negotiation totals, for controllers backed by a suggester.
    fn negotiation_stats(&self) -> Option<NegotiationStats> {
        None
    }
}

/// Plays a uniformly random legal move.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomController;

impl Controller for RandomController {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_action(
        &mut self,
        state: &GameState,
        side: SideId,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Action>, SessionError> {
        Ok(state.legal_moves(side).choose(rng).copied())
    }
}

/// Plays whatever the negotiator settles on.
#[derive(Debug)]
pub struct NegotiatingController<S> {
    name: String,
    negotiator: Negotiator<S>,
    well_target: Option<Coord>,
}

impl<S: Suggester> NegotiatingController<S> {
    /// Wrap a negotiator under a display name.
    pub fn new(name: impl Into<String>, negotiator: Negotiator<S>) -> Self {
        Self {
            name: name.into(),
            negotiator,
            well_target: None,
        }
    }

    /// The wrapped negotiator.
    #[must_use]
    pub const fn negotiator(&self) -> &Negotiator<S> {
        &self.negotiator
    }
}

impl<S: Suggester> Controller for NegotiatingController<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(
        &mut self,
        state: &GameState,
        side: SideId,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Action>, SessionError> {
        let decision = self.negotiator.negotiate(state, side, rng);
        self.well_target = decision.and_then(|d| d.well_target);
        Ok(decision.map(|d| d.action))
    }

    fn rejected(&mut self, action: Action, reason: &IllegalAction) {
        warn!(name = %self.name, %action, %reason, "negotiated action rejected");
        self.well_target = None;
    }

    fn choose_well_target(
        &mut self,
        _state: &GameState,
        _side: SideId,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<Coord>, SessionError> {
        Ok(self.well_target.take())
    }

    fn negotiation_stats(&self) -> Option<NegotiationStats> {
        Some(self.negotiator.stats())
    }
}

/// What a turn amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// An action was applied.
    Played {
        /// The applied action.
        action: Action,
        /// What it did.
        outcome: Outcome,
        /// Whether the session had to draw a random move.
        fallback: bool,
        /// Actions the executor rejected first.
        rejections: u32,
    },
    /// The side had no legal move.
    Skipped,
}

/// One completed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    /// 1-based turn number.
    pub turn: u32,
    /// Side that moved.
    pub side: SideId,
    /// What happened.
    pub outcome: TurnOutcome,
    /// MagicWell bonus set at the end of the turn.
    pub well_bonus: Option<WellBonus>,
    /// Winner after the turn.
    pub winner: Option<SideId>,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A side reached the victory threshold.
    Victory,
    /// `max_turns` was reached.
    TurnLimit,
    /// Both sides skipped in a row.
    Stalemate,
}

/// Final result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Winning side, if any.
    pub winner: Option<SideId>,
    /// Why play stopped.
    pub reason: EndReason,
    /// Turns played.
    pub turns: u32,
    /// Controller names, A then B.
    pub names: [String; 2],
    /// Final cell counts, A then B.
    pub territory: [usize; 2],
    /// Random moves drawn for each side.
    pub fallbacks: [u32; 2],
    /// Executor rejections for each side.
    pub rejections: [u32; 2],
    /// Negotiation totals for suggester-backed sides.
    pub negotiation: [Option<NegotiationStats>; 2],
}

/// A game in progress.
pub struct Session<R> {
    state: GameState,
    controllers: [Box<dyn Controller>; 2],
    rng: R,
    consecutive_skips: u32,
    fallbacks: [u32; 2],
    rejections: [u32; 2],
}

impl<R> fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("a", &self.controllers[0].name())
            .field("b", &self.controllers[1].name())
            .field("turn", &self.state.turn)
            .field("to_move", &self.state.to_move)
            .finish_non_exhaustive()
    }
}

impl<R: RngCore> Session<R> {
    /// Start a session from `state`, with `a` and `b` choosing for the two
    /// sides.
    pub fn new(state: GameState, a: Box<dyn Controller>, b: Box<dyn Controller>, rng: R) -> Self {
        Self {
            state,
            controllers: [a, b],
            rng,
            consecutive_skips: 0,
            fallbacks: [0; 2],
            rejections: [0; 2],
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Display name of a side's controller.
    #[must_use]
    pub fn controller_name(&self, side: SideId) -> &str {
        self.controllers[side.index()].name()
    }

    /// Why the game is over, if it is.
    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        if self.state.winner().is_some() {
            Some(EndReason::Victory)
        } else if self.consecutive_skips >= 2 {
            Some(EndReason::Stalemate)
        } else if self.state.turn >= self.state.config().max_turns {
            Some(EndReason::TurnLimit)
        } else {
            None
        }
    }

    /// Play one turn for the side to move.
    ///
    /// # Errors
    ///
    /// Returns an error if a controller abandons or an invariant breaks.
    pub fn play_turn(&mut self) -> Result<TurnReport, SessionError> {
        let side = self.state.to_move;
        let turn = self.state.turn + 1;
        self.state.begin_turn(side);

        let outcome = if self.state.legal_moves(side).is_empty() {
            info!(turn, %side, "no legal moves, turn skipped");
            self.consecutive_skips += 1;
            TurnOutcome::Skipped
        } else {
            self.consecutive_skips = 0;
            self.act(side)?
        };

        let well_bonus = if self.state.side(side).has_magic() {
            let nominated = self.controllers[side.index()].choose_well_target(
                &self.state,
                side,
                &mut self.rng,
            )?;
            self.state
                .settle_well_bonus(side, nominated, &mut self.rng)
        } else {
            None
        };

        let violations = check_invariants(&self.state);
        for violation in &violations {
            error!(turn, %violation, "invariant check failed");
        }
        if let Some(violation) = violations.into_iter().next() {
            return Err(violation.into());
        }

        let winner = self.state.winner();
        if let Some(winner) = winner {
            info!(turn, %winner, "side reached the victory threshold");
        }
        self.state.end_turn();

        Ok(TurnReport {
            turn,
            side,
            outcome,
            well_bonus,
            winner,
        })
    }

    fn act(&mut self, side: SideId) -> Result<TurnOutcome, SessionError> {
        let max_rejections = self.state.config().max_rejections;
        let controller = &mut self.controllers[side.index()];
        let mut rejections = 0;

        loop {
            let choice = if rejections < max_rejections {
                controller.choose_action(&self.state, side, &mut self.rng)?
            } else {
                None
            };

            let (action, fallback) = match choice {
                Some(action) => (action, false),
                None => {
                    let legal = self.state.legal_moves(side);
                    let Some(&action) = legal.choose(&mut self.rng) else {
                        return Ok(TurnOutcome::Skipped);
                    };
                    warn!(%side, %action, rejections, "drawing a random legal move");
                    self.fallbacks[side.index()] += 1;
                    (action, true)
                }
            };

            match self
                .state
                .apply(side, action, &mut RngDice(&mut self.rng))
            {
                Ok(outcome) => {
                    return Ok(TurnOutcome::Played {
                        action,
                        outcome,
                        fallback,
                        rejections,
                    });
                }
                Err(reason) if fallback => {
                    return Err(InvariantViolation::new(format!(
                        "enumerated move {action} was rejected: {reason}"
                    ))
                    .into());
                }
                Err(reason) => {
                    warn!(%side, %action, %reason, "action rejected");
                    rejections += 1;
                    self.rejections[side.index()] += 1;
                    controller.rejected(action, &reason);
                }
            }
        }
    }

    /// Play until the game ends, calling `on_turn` after every turn.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Session::play_turn`].
    pub fn run_with<F>(&mut self, mut on_turn: F) -> Result<GameSummary, SessionError>
    where
        F: FnMut(&GameState, &TurnReport),
    {
        loop {
            if let Some(reason) = self.end_reason() {
                return Ok(self.summary(reason));
            }
            let report = self.play_turn()?;
            on_turn(&self.state, &report);
        }
    }

    /// Play until the game ends.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Session::play_turn`].
    pub fn run(&mut self) -> Result<GameSummary, SessionError> {
        self.run_with(|_, _| {})
    }

    /// Summary of the game so far.
    #[must_use]
    pub fn summary(&self, reason: EndReason) -> GameSummary {
        GameSummary {
            winner: self.state.winner(),
            reason,
            turns: self.state.turn,
            names: SideId::BOTH.map(|id| self.controller_name(id).to_string()),
            territory: SideId::BOTH.map(|id| self.state.side(id).territory()),
            fallbacks: self.fallbacks,
            rejections: self.rejections,
            negotiation: SideId::BOTH.map(|id| self.controllers[id.index()].negotiation_stats()),
        }
    }
}
