//! Actions a side can take on its turn.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::game::Coord;

/// The three kinds of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    /// Claim an empty adjacent cell.
    Expand,
    /// Shield an owned cell.
    Fortify,
    /// Contest an adjacent enemy cell.
    Attack,
}

impl ActionKind {
    /// All kinds.
    pub const ALL: [ActionKind; 3] = [ActionKind::Expand, ActionKind::Fortify, ActionKind::Attack];

    /// Keyword used in suggestion replies.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            ActionKind::Expand => "EXPAND",
            ActionKind::Fortify => "FORTIFY",
            ActionKind::Attack => "ATTACK",
        }
    }

    /// Recognise a reply keyword (case-insensitive). `CONQUER` is accepted
    /// for `EXPAND`.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "EXPAND" | "CONQUER" => Some(ActionKind::Expand),
            "FORTIFY" => Some(ActionKind::Fortify),
            "ATTACK" => Some(ActionKind::Attack),
            _ => None,
        }
    }

    /// Recognise a single-letter human command (case-insensitive).
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'E' | 'C' => Some(ActionKind::Expand),
            'F' => Some(ActionKind::Fortify),
            'A' => Some(ActionKind::Attack),
            _ => None,
        }
    }
}

/// A single action against a target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Claim an empty adjacent cell.
    Expand(Coord),
    /// Shield an owned cell.
    Fortify(Coord),
    /// Contest an adjacent enemy cell.
    Attack(Coord),
}

impl Action {
    /// Build an action from its parts.
    #[must_use]
    pub const fn new(kind: ActionKind, target: Coord) -> Self {
        match kind {
            ActionKind::Expand => Action::Expand(target),
            ActionKind::Fortify => Action::Fortify(target),
            ActionKind::Attack => Action::Attack(target),
        }
    }

    /// The action kind.
    #[must_use]
    pub const fn kind(self) -> ActionKind {
        match self {
            Action::Expand(_) => ActionKind::Expand,
            Action::Fortify(_) => ActionKind::Fortify,
            Action::Attack(_) => ActionKind::Attack,
        }
    }

    /// The target cell.
    #[must_use]
    pub const fn target(self) -> Coord {
        match self {
            Action::Expand(c) | Action::Fortify(c) | Action::Attack(c) => c,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind().keyword(), self.target())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
