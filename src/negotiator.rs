//! Suggestion negotiator.
//!
//! Turns an unreliable free-text suggestion service into exactly one legal
//! action. A [`Negotiation`] is an explicit state machine:
//!
//! ```text
//! Idle -> AwaitingSuggestion -> Validating -> Resolved
//!              ^                     |
//!              +---------------------+   (parse failure or illegal move)
//! ```
//!
//! Running out of attempts, or a timeout/transport failure when
//! `abort_on_transport_failure` is set, ends in `Fallback` with a uniformly
//! drawn legal move. A side with no legal moves ends in `Failed`.

mod http;
mod prompt;
mod suggester;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::NegotiatorConfig;
use crate::error::IllegalAction;
use crate::game::{Action, Coord, GameState, SideId};
use crate::parse::{ReplyParseError, parse_reply};

pub use http::HttpSuggester;
pub use prompt::{describe_state, rejection_feedback, system_prompt};
pub use suggester::{ScriptedSuggester, SuggestError, Suggester, SuggestionRequest};

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionSource {
    /// A suggestion that parsed and validated.
    Suggested,
    /// A uniformly drawn legal move.
    Fallback,
}

/// The negotiated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Legal at the time it was decided.
    pub action: Action,
    /// How it was chosen.
    pub source: DecisionSource,
    /// MagicWell nomination from the accepted reply.
    pub well_target: Option<Coord>,
    /// Suggestion requests made.
    pub attempts: u32,
}

/// Why a single attempt did not produce a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The reply did not follow the grammar.
    Parse(ReplyParseError),
    /// The reply parsed but named an illegal action.
    Illegal(IllegalAction),
    /// The service produced no reply.
    Transport(SuggestError),
}

impl AttemptFailure {
    fn reason(&self) -> String {
        match self {
            AttemptFailure::Parse(e) => e.to_string(),
            AttemptFailure::Illegal(e) => e.to_string(),
            AttemptFailure::Transport(e) => e.to_string(),
        }
    }
}

/// Negotiation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Not started.
    Idle,
    /// About to request suggestion number `attempt`.
    AwaitingSuggestion {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// A reply arrived and is about to be checked.
    Validating {
        /// 1-based attempt number.
        attempt: u32,
        /// Raw reply text.
        reply: String,
    },
    /// A suggestion was accepted.
    Resolved(Decision),
    /// Suggestions were exhausted or abandoned; a random legal move was drawn.
    Fallback(Decision),
    /// No legal move exists.
    Failed,
}

impl Phase {
    /// Whether the negotiation has finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Phase::Resolved(_) | Phase::Fallback(_) | Phase::Failed)
    }

    /// The decision of a finished negotiation, if one was reached.
    #[must_use]
    pub const fn decision(&self) -> Option<Decision> {
        match self {
            Phase::Resolved(decision) | Phase::Fallback(decision) => Some(*decision),
            _ => None,
        }
    }
}

/// One negotiation for one side's turn.
#[derive(Debug)]
pub struct Negotiation<'a, S: Suggester + ?Sized> {
    config: &'a NegotiatorConfig,
    suggester: &'a mut S,
    state: &'a GameState,
    side: SideId,
    legal: Vec<Action>,
    system: String,
    prompt: String,
    feedback: Option<String>,
    requests: u32,
    failures: Vec<AttemptFailure>,
    phase: Phase,
}

impl<'a, S: Suggester + ?Sized> Negotiation<'a, S> {
    /// Prepare a negotiation for `side` in `state`.
    pub fn new(
        config: &'a NegotiatorConfig,
        suggester: &'a mut S,
        state: &'a GameState,
        side: SideId,
    ) -> Self {
        let legal = state.legal_moves(side);
        let system = system_prompt(state.config());
        let prompt = describe_state(state, side, &legal);
        Self {
            config,
            suggester,
            state,
            side,
            legal,
            system,
            prompt,
            feedback: None,
            requests: 0,
            failures: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Failed attempts so far, in order.
    #[must_use]
    pub fn failures(&self) -> &[AttemptFailure] {
        &self.failures
    }

    /// Legal moves the negotiation validates against.
    #[must_use]
    pub fn legal_moves(&self) -> &[Action] {
        &self.legal
    }

    /// Advance one transition. Terminal phases stay put.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Phase {
        let phase = std::mem::replace(&mut self.phase, Phase::Failed);
        self.phase = match phase {
            Phase::Idle => {
                debug!(side = %self.side, legal = self.legal.len(), "negotiation started");
                if self.legal.is_empty() {
                    info!(side = %self.side, "no legal moves");
                    Phase::Failed
                } else if self.config.max_attempts == 0 {
                    self.fallback(rng)
                } else {
                    Phase::AwaitingSuggestion { attempt: 1 }
                }
            }
            Phase::AwaitingSuggestion { attempt } => self.request(attempt, rng),
            Phase::Validating { attempt, reply } => self.validate(attempt, &reply, rng),
            terminal => terminal,
        };
        &self.phase
    }

    /// Step until a terminal phase and return its decision.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Decision> {
        while !self.phase.is_terminal() {
            self.step(rng);
        }
        self.phase.decision()
    }

    fn request<R: Rng + ?Sized>(&mut self, attempt: u32, rng: &mut R) -> Phase {
        if attempt > 1 && !self.config.retry_delay().is_zero() {
            std::thread::sleep(self.config.retry_delay());
        }

        let request = SuggestionRequest {
            system: &self.system,
            prompt: &self.prompt,
            side: self.side,
            attempt,
            feedback: self.feedback.as_deref(),
        };
        self.requests += 1;

        match self.suggester.suggest(&request) {
            Ok(reply) => Phase::Validating { attempt, reply },
            Err(e) => {
                warn!(side = %self.side, attempt, error = %e, "suggestion request failed");
                let hard = e.is_hard_failure();
                self.fail(AttemptFailure::Transport(e));
                if hard && self.config.abort_on_transport_failure {
                    self.fallback(rng)
                } else {
                    self.next_attempt(attempt, rng)
                }
            }
        }
    }

    fn validate<R: Rng + ?Sized>(&mut self, attempt: u32, reply: &str, rng: &mut R) -> Phase {
        let suggestion = match parse_reply(reply, self.state.board.size()) {
            Ok(suggestion) => suggestion,
            Err(e) => {
                warn!(side = %self.side, attempt, error = %e, reply, "unparseable suggestion");
                self.fail(AttemptFailure::Parse(e));
                return self.next_attempt(attempt, rng);
            }
        };

        if let Err(e) = self.state.validate(self.side, suggestion.action) {
            warn!(side = %self.side, attempt, action = %suggestion.action, error = %e, "illegal suggestion");
            self.fail(AttemptFailure::Illegal(e));
            return self.next_attempt(attempt, rng);
        }

        info!(side = %self.side, attempt, action = %suggestion.action, "suggestion accepted");
        Phase::Resolved(Decision {
            action: suggestion.action,
            source: DecisionSource::Suggested,
            well_target: suggestion.well_target,
            attempts: self.requests,
        })
    }

    fn fail(&mut self, failure: AttemptFailure) {
        self.feedback = Some(rejection_feedback(&failure.reason()));
        self.failures.push(failure);
    }

    fn next_attempt<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Phase {
        if attempt >= self.config.max_attempts {
            self.fallback(rng)
        } else {
            Phase::AwaitingSuggestion {
                attempt: attempt + 1,
            }
        }
    }

    fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> Phase {
        match self.legal.choose(rng) {
            Some(&action) => {
                warn!(side = %self.side, %action, attempts = self.requests, "falling back to a random legal move");
                Phase::Fallback(Decision {
                    action,
                    source: DecisionSource::Fallback,
                    well_target: None,
                    attempts: self.requests,
                })
            }
            None => Phase::Failed,
        }
    }
}

/// Running totals over every negotiation a [`Negotiator`] has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NegotiationStats {
    /// Negotiations started.
    pub negotiations: u32,
    /// Accepted suggestions.
    pub resolved: u32,
    /// Random fallbacks.
    pub fallbacks: u32,
    /// Negotiations with no legal move.
    pub failed: u32,
    /// Suggestion requests made.
    pub requests: u32,
    /// Replies that did not parse.
    pub parse_failures: u32,
    /// Replies naming illegal actions.
    pub illegal_suggestions: u32,
    /// Requests that produced no reply.
    pub transport_failures: u32,
}

impl NegotiationStats {
    fn record<S: Suggester + ?Sized>(&mut self, negotiation: &Negotiation<'_, S>) {
        self.negotiations += 1;
        self.requests += negotiation.requests;
        match negotiation.phase() {
            Phase::Resolved(_) => self.resolved += 1,
            Phase::Fallback(_) => self.fallbacks += 1,
            _ => self.failed += 1,
        }
        for failure in negotiation.failures() {
            match failure {
                AttemptFailure::Parse(_) => self.parse_failures += 1,
                AttemptFailure::Illegal(_) => self.illegal_suggestions += 1,
                AttemptFailure::Transport(_) => self.transport_failures += 1,
            }
        }
    }
}

/// A suggester plus retry policy, reused across turns.
#[derive(Debug)]
pub struct Negotiator<S> {
    config: NegotiatorConfig,
    suggester: S,
    stats: NegotiationStats,
}

impl<S: Suggester> Negotiator<S> {
    /// Wrap `suggester` with `config`.
    pub fn new(config: NegotiatorConfig, suggester: S) -> Self {
        Self {
            config,
            suggester,
            stats: NegotiationStats::default(),
        }
    }

    /// Negotiate one action for `side`. `None` only when `side` has no
    /// legal move.
    pub fn negotiate<R: Rng + ?Sized>(
        &mut self,
        state: &GameState,
        side: SideId,
        rng: &mut R,
    ) -> Option<Decision> {
        let mut negotiation = Negotiation::new(&self.config, &mut self.suggester, state, side);
        let decision = negotiation.run(rng);
        self.stats.record(&negotiation);
        decision
    }

    /// Totals so far.
    #[must_use]
    pub const fn stats(&self) -> NegotiationStats {
        self.stats
    }

    /// The wrapped suggester.
    #[must_use]
    pub const fn suggester(&self) -> &S {
        &self.suggester
    }

    /// Retry policy in force.
    #[must_use]
    pub const fn config(&self) -> &NegotiatorConfig {
        &self.config
    }
}
