//! Text parsers at the game's input boundaries.
//!
//! Two sources feed actions in as text: suggestion-service replies and
//! human commands. Both parse into syntactically valid values only;
//! legality is always checked afterwards by the rules engine.

use thiserror::Error;

use crate::error::CoordParseError;
use crate::game::{Action, ActionKind, Coord};

/// Label of the optional MagicWell line in a suggestion reply.
pub const WELL_TARGET_LABEL: &str = "WELL_TARGET";

/// A parsed suggestion reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    /// The proposed action.
    pub action: Action,
    /// Cell nominated for the MagicWell bonus, if the reply named one.
    pub well_target: Option<Coord>,
}

/// Why a suggestion reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyParseError {
    /// The reply had no non-blank line.
    #[error("empty reply")]
    Empty,
    /// The first line has no `KEYWORD: COORD` separator.
    #[error("expected 'ACTION: COORDINATE', got '{0}'")]
    MissingSeparator(String),
    /// The keyword is not one of the action names.
    #[error("unknown action keyword '{0}'")]
    UnknownKeyword(String),
    /// The coordinate token is malformed or off the board.
    #[error(transparent)]
    Coord(#[from] CoordParseError),
}

/// Why a human command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// Blank input.
    #[error("empty command")]
    Empty,
    /// First token is not `E`, `C`, `F` or `A`.
    #[error("unknown action '{0}' (use E, F or A)")]
    UnknownAction(String),
    /// No coordinate after the action letter.
    #[error("missing target coordinate")]
    MissingTarget,
    /// Extra tokens after the coordinate.
    #[error("unexpected input after the coordinate: '{0}'")]
    TrailingInput(String),
    /// The coordinate token is malformed or off the board.
    #[error(transparent)]
    Coord(#[from] CoordParseError),
}

/// Parse a suggestion-service reply for a `size`×`size` board.
///
/// The first non-blank line must be `KEYWORD: COORD`. If the next
/// non-blank line is `WELL_TARGET: COORD` it supplies the MagicWell
/// nomination; a malformed nomination is dropped without failing the
/// reply. Anything after that is ignored.
///
/// # Errors
///
/// Returns an error if the first line is not exactly one action keyword
/// and one well-formed coordinate.
pub fn parse_reply(text: &str, size: u8) -> Result<Suggestion, ReplyParseError> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let first = lines.next().ok_or(ReplyParseError::Empty)?;
    let (label, value) = first
        .split_once(':')
        .ok_or_else(|| ReplyParseError::MissingSeparator(first.to_string()))?;

    let label = label.trim();
    let kind = ActionKind::from_keyword(label)
        .ok_or_else(|| ReplyParseError::UnknownKeyword(label.to_string()))?;
    let target = Coord::parse(value, size)?;

    let well_target = lines.next().and_then(|line| parse_well_target(line, size));

    Ok(Suggestion {
        action: Action::new(kind, target),
        well_target,
    })
}

fn parse_well_target(line: &str, size: u8) -> Option<Coord> {
    let (label, value) = line.split_once(':')?;
    if !label.trim().eq_ignore_ascii_case(WELL_TARGET_LABEL) {
        return None;
    }
    Coord::parse(value, size).ok()
}

/// Parse a human command such as `E B3` for a `size`×`size` board.
///
/// # Errors
///
/// Returns an error describing what to fix; callers re-prompt.
pub fn parse_human_command(input: &str, size: u8) -> Result<Action, CommandParseError> {
    let mut parts = input.split_whitespace();
    let verb = parts.next().ok_or(CommandParseError::Empty)?;

    let mut letters = verb.chars();
    let kind = match (letters.next(), letters.next()) {
        (Some(letter), None) => ActionKind::from_letter(letter),
        _ => None,
    }
    .ok_or_else(|| CommandParseError::UnknownAction(verb.to_string()))?;

    let target = parts.next().ok_or(CommandParseError::MissingTarget)?;
    let target = Coord::parse(target, size)?;

    let rest: Vec<&str> = parts.collect();
    if !rest.is_empty() {
        return Err(CommandParseError::TrailingInput(rest.join(" ")));
    }

    Ok(Action::new(kind, target))
}
