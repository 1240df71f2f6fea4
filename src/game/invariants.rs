//! Game invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented game. The session
//! runs them after every action and aborts if any fail.

use crate::error::InvariantViolation;
use crate::game::{CellMark, GameState, SideId, SpecialItem};

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (coord, mark) in state.board.iter() {
        let claimed_by: Vec<SideId> = SideId::BOTH
            .into_iter()
            .filter(|id| state.side(*id).owns(coord))
            .collect();

        match (mark, claimed_by.as_slice()) {
            (CellMark::Empty, []) => {}
            (CellMark::Owned(owner), [ledger]) if owner == *ledger => {}
            _ => violations.push(InvariantViolation::new(format!(
                "cell {coord} is marked {mark:?} but claimed by {claimed_by:?}"
            ))),
        }

        if let Some(item) = state.board.special(coord) {
            if item.is_holdable() && mark != CellMark::Empty {
                violations.push(InvariantViolation::new(format!(
                    "{item:?} left on the board at owned cell {coord}"
                )));
            }
        }
    }

    for side in &state.sides {
        for coord in side.owned() {
            if !state.board.in_bounds(*coord) {
                violations.push(InvariantViolation::new(format!(
                    "side {} owns off-board cell {coord}",
                    side.id
                )));
            }
        }

        let held = side
            .power_sources()
            .iter()
            .map(|c| (*c, SpecialItem::PowerSource))
            .chain(side.magic_wells().iter().map(|c| (*c, SpecialItem::MagicWell)));
        for (coord, item) in held {
            if !side.owns(coord) {
                violations.push(InvariantViolation::new(format!(
                    "side {} holds {item:?} at {coord} without owning it",
                    side.id
                )));
            }
        }

        let overlap = side
            .power_sources()
            .intersection(side.magic_wells())
            .next();
        if let Some(coord) = overlap {
            violations.push(InvariantViolation::new(format!(
                "side {} holds two items at {coord}",
                side.id
            )));
        }
    }

    if let Some(bonus) = state.well_bonus {
        if state.board.owner(bonus.coord).is_none() {
            violations.push(InvariantViolation::new(format!(
                "magic well bonus on unclaimed cell {}",
                bonus.coord
            )));
        }
    }

    let threshold = usize::from(state.config().victory_threshold);
    if state.sides.iter().all(|side| side.territory() >= threshold) {
        violations.push(InvariantViolation::new(
            "both sides reached the victory threshold",
        ));
    }

    violations
}
