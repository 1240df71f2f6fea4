//! Move executor.
//!
//! Applies one action to the board and both ledgers. Preconditions are
//! re-checked here through [`Rules::validate`] whatever the caller already
//! checked; a failing action is rejected before anything is touched.

use serde::Serialize;
use tracing::info;

use crate::error::IllegalAction;
use crate::game::{
    Action, Board, CellMark, Coord, Dice, GameState, Rules, Side, SideId, SpecialItem,
};

/// Dice values of a resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Roll {
    /// Attacker's total.
    pub attack: u8,
    /// Defender's total.
    pub defense: u8,
}

/// What an applied action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// An empty cell was claimed.
    Expanded {
        /// Claimed cell.
        target: Coord,
        /// PowerSource or MagicWell picked up from the cell.
        captured: Option<SpecialItem>,
    },
    /// A shield was placed.
    Fortified {
        /// Shielded cell.
        target: Coord,
        /// Held PowerSource or MagicWell destroyed by the fortification.
        destroyed: Option<SpecialItem>,
    },
    /// The attacker took the cell.
    Captured {
        /// Taken cell.
        target: Coord,
        /// Dice totals.
        roll: Roll,
        /// PowerSource or MagicWell taken over from the defender.
        seized: Option<SpecialItem>,
        /// Whether a shield on the cell was destroyed.
        shield_destroyed: bool,
    },
    /// The defender held. Nothing changed.
    Repelled {
        /// Contested cell.
        target: Coord,
        /// Dice totals.
        roll: Roll,
    },
}

impl Outcome {
    /// The cell the action targeted.
    #[must_use]
    pub const fn target(&self) -> Coord {
        match self {
            Outcome::Expanded { target, .. }
            | Outcome::Fortified { target, .. }
            | Outcome::Captured { target, .. }
            | Outcome::Repelled { target, .. } => *target,
        }
    }

    /// Whether any state changed.
    #[must_use]
    pub const fn changed_state(&self) -> bool {
        !matches!(self, Outcome::Repelled { .. })
    }
}

/// Validate and apply `action` for `actor`.
pub(crate) fn execute<D: Dice + ?Sized>(
    state: &mut GameState,
    actor: SideId,
    action: Action,
    dice: &mut D,
) -> Result<Outcome, IllegalAction> {
    state.validate(actor, action)?;

    let boosted = state.boosted_for(actor.opponent());
    let GameState {
        rules,
        board,
        sides,
        ..
    } = state;
    let [a, b] = sides;
    let (own, enemy) = match actor {
        SideId::A => (a, b),
        SideId::B => (b, a),
    };

    let target = action.target();
    let outcome = match action {
        Action::Expand(_) => expand(board, own, target),
        Action::Fortify(_) => fortify(board, own, target),
        Action::Attack(_) => attack(rules, board, own, enemy, target, boosted, dice),
    };

    info!(side = %actor, %action, ?outcome, "action resolved");
    Ok(outcome)
}

fn expand(board: &mut Board, own: &mut Side, target: Coord) -> Outcome {
    own.claim(target);
    board.set_mark(target, CellMark::Owned(own.id));

    // A shield stays on the cell and now protects its new owner.
    let captured = match board.special(target) {
        Some(item) if item.is_holdable() => {
            board.remove_special(target);
            own.hold(target, item);
            Some(item)
        }
        _ => None,
    };

    Outcome::Expanded { target, captured }
}

fn fortify(board: &mut Board, own: &mut Side, target: Coord) -> Outcome {
    let mut destroyed = own.drop_item(target);
    if let Some(item) = board.special(target) {
        if item.is_holdable() {
            board.remove_special(target);
            destroyed = destroyed.or(Some(item));
        }
    }
    board.place_special(target, SpecialItem::Shield);

    Outcome::Fortified { target, destroyed }
}

fn attack<D: Dice + ?Sized>(
    rules: &Rules,
    board: &mut Board,
    own: &mut Side,
    enemy: &mut Side,
    target: Coord,
    boosted: Option<Coord>,
    dice: &mut D,
) -> Outcome {
    let shielded = board.is_shielded(target);
    let roll = Roll {
        attack: rules.roll_attack(own, dice),
        defense: rules.roll_defense(target, shielded, boosted, dice),
    };

    // Ties go to the defender.
    if roll.attack <= roll.defense {
        return Outcome::Repelled { target, roll };
    }

    let overlay_item = board.special(target).filter(|item| item.is_holdable());
    let seized = enemy.release(target).or(overlay_item);

    if shielded {
        board.remove_special(target);
    }

    own.claim(target);
    if let Some(item) = seized {
        own.hold(target, item);
        if overlay_item.is_some() {
            board.remove_special(target);
        }
    }
    board.set_mark(target, CellMark::Owned(own.id));

    Outcome::Captured {
        target,
        roll,
        seized,
        shield_destroyed: shielded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::ScriptedDice;

    fn state() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    fn give(state: &mut GameState, side: SideId, coord: Coord) {
        state.board.set_mark(coord, CellMark::Owned(side));
        state.sides[side.index()].claim(coord);
    }

    #[test]
    fn test_expand_claims_cell() {
        let mut state = state();
        let mut dice = ScriptedDice::default();
        let outcome = state
            .apply(SideId::A, Action::Expand(Coord::new(0, 1)), &mut dice)
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Expanded {
                target: Coord::new(0, 1),
                captured: None
            }
        );
        assert!(state.side(SideId::A).owns(Coord::new(0, 1)));
        assert_eq!(state.board.owner(Coord::new(0, 1)), Some(SideId::A));
    }

    #[test]
    fn test_expand_picks_up_items_and_keeps_shields() {
        let mut state = state();
        let mut dice = ScriptedDice::default();
        state.board.place_special(Coord::new(0, 1), SpecialItem::PowerSource);
        state.board.place_special(Coord::new(1, 0), SpecialItem::Shield);

        let outcome = state
            .apply(SideId::A, Action::Expand(Coord::new(0, 1)), &mut dice)
            .unwrap();
        assert!(matches!(
            outcome,
            Outcome::Expanded {
                captured: Some(SpecialItem::PowerSource),
                ..
            }
        ));
        assert_eq!(state.board.special(Coord::new(0, 1)), None);
        assert!(state.side(SideId::A).power_sources().contains(&Coord::new(0, 1)));

        state
            .apply(SideId::A, Action::Expand(Coord::new(1, 0)), &mut dice)
            .unwrap();
        assert!(state.board.is_shielded(Coord::new(1, 0)));
        assert!(state.side(SideId::A).owns(Coord::new(1, 0)));
    }

    #[test]
    fn test_fortify_destroys_held_item() {
        let mut state = state();
        let mut dice = ScriptedDice::default();
        state.board.place_special(Coord::new(0, 1), SpecialItem::MagicWell);
        state
            .apply(SideId::A, Action::Expand(Coord::new(0, 1)), &mut dice)
            .unwrap();
        assert!(state.side(SideId::A).has_magic());

        let outcome = state
            .apply(SideId::A, Action::Fortify(Coord::new(0, 1)), &mut dice)
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Fortified {
                target: Coord::new(0, 1),
                destroyed: Some(SpecialItem::MagicWell)
            }
        );
        assert!(!state.side(SideId::A).has_magic());
        assert!(state.side(SideId::A).owns(Coord::new(0, 1)));
        assert!(state.board.is_shielded(Coord::new(0, 1)));
    }

    #[test]
    fn test_rejected_action_changes_nothing() {
        let mut state = state();
        let mut dice = ScriptedDice::new([6, 1]);
        let before_board = state.board.clone();
        let before_sides = state.sides.clone();

        let err = state
            .apply(SideId::A, Action::Attack(Coord::new(4, 4)), &mut dice)
            .unwrap_err();
        assert_eq!(err, IllegalAction::NotAdjacent(Coord::new(4, 4)));
        assert_eq!(state.sides, before_sides);
        assert_eq!(state.board.owner(Coord::new(4, 4)), before_board.owner(Coord::new(4, 4)));
        assert_eq!(dice.remaining(), 2, "no dice rolled for an illegal attack");
    }

    #[test]
    fn test_attack_win_transfers_cell_and_items() {
        let mut state = state();
        give(&mut state, SideId::A, Coord::new(2, 1));
        give(&mut state, SideId::B, Coord::new(2, 2));
        state.sides[SideId::B.index()].hold(Coord::new(2, 2), SpecialItem::PowerSource);

        let mut dice = ScriptedDice::new([5, 2]);
        let outcome = state
            .apply(SideId::A, Action::Attack(Coord::new(2, 2)), &mut dice)
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Captured {
                target: Coord::new(2, 2),
                roll: Roll { attack: 5, defense: 2 },
                seized: Some(SpecialItem::PowerSource),
                shield_destroyed: false
            }
        );
        assert!(!state.side(SideId::B).owns(Coord::new(2, 2)));
        assert!(!state.side(SideId::B).has_power());
        assert!(state.side(SideId::A).power_sources().contains(&Coord::new(2, 2)));
        assert_eq!(state.board.owner(Coord::new(2, 2)), Some(SideId::A));
    }

    #[test]
    fn test_attack_tie_goes_to_defender() {
        let mut state = state();
        give(&mut state, SideId::A, Coord::new(2, 1));
        give(&mut state, SideId::B, Coord::new(2, 2));
        let before = state.sides.clone();

        let mut dice = ScriptedDice::new([4, 4]);
        let outcome = state
            .apply(SideId::A, Action::Attack(Coord::new(2, 2)), &mut dice)
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Repelled {
                target: Coord::new(2, 2),
                roll: Roll { attack: 4, defense: 4 }
            }
        );
        assert!(!outcome.changed_state());
        assert_eq!(state.sides, before);
    }

    #[test]
    fn test_attack_destroys_shield_on_capture() {
        let mut state = state();
        give(&mut state, SideId::A, Coord::new(2, 1));
        give(&mut state, SideId::B, Coord::new(2, 2));
        state.board.place_special(Coord::new(2, 2), SpecialItem::Shield);

        // 6 against 4 + 1 shield
        let mut dice = ScriptedDice::new([6, 4]);
        let outcome = state
            .apply(SideId::A, Action::Attack(Coord::new(2, 2)), &mut dice)
            .unwrap();

        assert!(matches!(
            outcome,
            Outcome::Captured {
                roll: Roll { attack: 6, defense: 5 },
                shield_destroyed: true,
                ..
            }
        ));
        assert!(!state.board.is_shielded(Coord::new(2, 2)));
    }

    #[test]
    fn test_magic_bonus_only_protects_its_cell() {
        let mut state = state();
        give(&mut state, SideId::A, Coord::new(2, 1));
        give(&mut state, SideId::B, Coord::new(2, 2));
        give(&mut state, SideId::B, Coord::new(1, 1));
        state.well_bonus = Some(crate::game::WellBonus {
            coord: Coord::new(2, 2),
            beneficiary: SideId::B,
        });

        // 4 vs 3 + 1 magic: tie, repelled
        let mut dice = ScriptedDice::new([4, 3]);
        let outcome = state
            .apply(SideId::A, Action::Attack(Coord::new(2, 2)), &mut dice)
            .unwrap();
        assert!(matches!(outcome, Outcome::Repelled { .. }));

        // Same dice against the unboosted neighbour: captured
        let mut dice = ScriptedDice::new([4, 3]);
        let outcome = state
            .apply(SideId::A, Action::Attack(Coord::new(1, 1)), &mut dice)
            .unwrap();
        assert!(matches!(outcome, Outcome::Captured { .. }));
    }
}
