//! Rules engine: adjacency, dice, legality and the win condition.
//!
//! The rules never mutate state. The executor and the negotiator both go
//! through [`Rules::validate`], so a suggestion is held to exactly the
//! preconditions the executor enforces.

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::error::IllegalAction;
use crate::game::{Action, Board, CellMark, Coord, Side, SideId};

/// Source of die rolls.
pub trait Dice {
    /// Roll a die with `sides` faces, returning a value in `1..=sides`.
    fn roll(&mut self, sides: u8) -> u8;
}

/// Dice backed by any [`rand::Rng`].
#[derive(Debug)]
pub struct RngDice<'a, R: ?Sized>(pub &'a mut R);

impl<R: Rng + ?Sized> Dice for RngDice<'_, R> {
    fn roll(&mut self, sides: u8) -> u8 {
        self.0.gen_range(1..=sides.max(1))
    }
}

/// Dice that replay a fixed sequence, for deterministic scenarios.
///
/// Values are clamped to the die. When the script runs out every further
/// roll is 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
}

impl ScriptedDice {
    /// Create dice that yield `rolls` in order.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Rolls not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, sides: u8) -> u8 {
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides.max(1))
    }
}

/// Rules bound to a configuration.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    config: GameConfig,
}

impl Rules {
    /// Create a rules engine for the given configuration.
    #[must_use]
    pub const fn new(config: GameConfig) -> Self {
        Self { config }
    }

    /// The configuration these rules apply.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True iff `target` is at Manhattan distance exactly 1 from a cell
    /// owned by `side`. Diagonals never count.
    #[must_use]
    pub fn is_adjacent(&self, target: Coord, side: &Side) -> bool {
        let (adjacent, count) = target.adjacent(self.config.grid_size);
        adjacent[..count as usize].iter().any(|c| side.owns(*c))
    }

    /// Roll for an attacker. Holding any PowerSource adds the flat bonus
    /// once, however many are held.
    pub fn roll_attack<D: Dice + ?Sized>(&self, side: &Side, dice: &mut D) -> u8 {
        let base = dice.roll(self.config.dice_sides);
        let bonus = if side.has_power() {
            self.config.power_attack_bonus
        } else {
            0
        };
        debug!(side = %side.id, base, bonus, "attack roll");
        base.saturating_add(bonus)
    }

    /// Roll for the defender of `coord`.
    ///
    /// The magic bonus applies only when `boosted` is exactly `coord`.
    pub fn roll_defense<D: Dice + ?Sized>(
        &self,
        coord: Coord,
        shielded: bool,
        boosted: Option<Coord>,
        dice: &mut D,
    ) -> u8 {
        let base = dice.roll(self.config.dice_sides);
        let shield = if shielded {
            self.config.shield_defense_bonus
        } else {
            0
        };
        let magic = if boosted == Some(coord) {
            self.config.magic_defense_bonus
        } else {
            0
        };
        debug!(%coord, base, shield, magic, "defense roll");
        base.saturating_add(shield).saturating_add(magic)
    }

    /// First side, in A-then-B order, whose territory reaches the threshold.
    ///
    /// Only one side's territory changes per action, so both sides can never
    /// cross the threshold on the same action.
    #[must_use]
    pub fn check_winner(&self, sides: &[Side; 2]) -> Option<SideId> {
        let threshold = usize::from(self.config.victory_threshold);
        sides
            .iter()
            .find(|side| side.territory() >= threshold)
            .map(|side| side.id)
    }

    /// Every legal action for `actor`, deduplicated by kind and target.
    ///
    /// The order is stable for a given state but carries no meaning.
    #[must_use]
    pub fn legal_moves(&self, board: &Board, actor: &Side, opponent: &Side) -> Vec<Action> {
        let mut moves = BTreeSet::new();

        for &owned in actor.owned() {
            if !board.is_shielded(owned) {
                moves.insert(Action::Fortify(owned));
            }

            let (adjacent, count) = owned.adjacent(board.size());
            for &neighbour in &adjacent[..count as usize] {
                if board.mark(neighbour) == Some(CellMark::Empty) {
                    moves.insert(Action::Expand(neighbour));
                } else if opponent.owns(neighbour) {
                    moves.insert(Action::Attack(neighbour));
                }
            }
        }

        moves.into_iter().collect()
    }

    /// Check an action's preconditions without applying it.
    ///
    /// # Errors
    ///
    /// Returns the first precondition the action fails.
    pub fn validate(
        &self,
        board: &Board,
        actor: &Side,
        opponent: &Side,
        action: Action,
    ) -> Result<(), IllegalAction> {
        let target = action.target();
        if !board.in_bounds(target) {
            return Err(IllegalAction::OutOfBounds(target));
        }

        match action {
            Action::Expand(_) => {
                if board.mark(target) != Some(CellMark::Empty) {
                    return Err(IllegalAction::NotEmpty(target));
                }
                if !self.is_adjacent(target, actor) {
                    return Err(IllegalAction::NotAdjacent(target));
                }
            }
            Action::Fortify(_) => {
                if !actor.owns(target) {
                    return Err(IllegalAction::NotOwned(target));
                }
                if board.is_shielded(target) {
                    return Err(IllegalAction::AlreadyShielded(target));
                }
            }
            Action::Attack(_) => {
                // An unowned shielded cell is never an attack target; it can
                // only be claimed by expanding into it.
                if !opponent.owns(target) || board.owner(target) != Some(opponent.id) {
                    return Err(IllegalAction::NotEnemy(target));
                }
                if !self.is_adjacent(target, actor) {
                    return Err(IllegalAction::NotAdjacent(target));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SpecialItem;

    fn setup() -> (Rules, Board, Side, Side) {
        let config = GameConfig::default();
        let mut board = Board::new(config.grid_size).unwrap();
        board.set_mark(Coord::new(0, 0), CellMark::Owned(SideId::A));
        board.set_mark(Coord::new(4, 4), CellMark::Owned(SideId::B));
        (
            Rules::new(config),
            board,
            Side::new(SideId::A, Coord::new(0, 0)),
            Side::new(SideId::B, Coord::new(4, 4)),
        )
    }

    fn give(board: &mut Board, side: &mut Side, coord: Coord) {
        board.set_mark(coord, CellMark::Owned(side.id));
        side.claim(coord);
    }

    #[test]
    fn test_adjacency_is_orthogonal_only() {
        let (rules, _, a, _) = setup();
        assert!(rules.is_adjacent(Coord::new(0, 1), &a));
        assert!(rules.is_adjacent(Coord::new(1, 0), &a));
        assert!(!rules.is_adjacent(Coord::new(1, 1), &a));
        assert!(!rules.is_adjacent(Coord::new(0, 0), &a));
    }

    #[test]
    fn test_initial_legal_moves() {
        let (rules, board, a, b) = setup();
        let moves = rules.legal_moves(&board, &a, &b);
        assert_eq!(moves.len(), 3);
        assert!(moves.contains(&Action::Fortify(Coord::new(0, 0))));
        assert!(moves.contains(&Action::Expand(Coord::new(0, 1))));
        assert!(moves.contains(&Action::Expand(Coord::new(1, 0))));
    }

    #[test]
    fn test_legal_moves_are_deduplicated() {
        let (rules, mut board, mut a, b) = setup();
        give(&mut board, &mut a, Coord::new(0, 1));
        give(&mut board, &mut a, Coord::new(1, 0));
        // (1,1) is reachable from both (0,1) and (1,0)
        let moves = rules.legal_moves(&board, &a, &b);
        let expands = moves
            .iter()
            .filter(|m| **m == Action::Expand(Coord::new(1, 1)))
            .count();
        assert_eq!(expands, 1);
    }

    #[test]
    fn test_shielded_cells_are_not_fortify_targets() {
        let (rules, mut board, a, b) = setup();
        board.place_special(Coord::new(0, 0), SpecialItem::Shield);
        let moves = rules.legal_moves(&board, &a, &b);
        assert!(!moves.contains(&Action::Fortify(Coord::new(0, 0))));
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Fortify(Coord::new(0, 0))),
            Err(IllegalAction::AlreadyShielded(Coord::new(0, 0)))
        );
    }

    #[test]
    fn test_enemy_neighbours_are_attack_targets() {
        let (rules, mut board, mut a, mut b) = setup();
        give(&mut board, &mut a, Coord::new(2, 1));
        give(&mut board, &mut b, Coord::new(2, 2));
        let moves = rules.legal_moves(&board, &a, &b);
        assert!(moves.contains(&Action::Attack(Coord::new(2, 2))));
        assert!(!moves.contains(&Action::Expand(Coord::new(2, 2))));
    }

    #[test]
    fn test_validate_reports_each_precondition() {
        let (rules, mut board, a, mut b) = setup();
        give(&mut board, &mut b, Coord::new(3, 3));

        assert_eq!(
            rules.validate(&board, &a, &b, Action::Expand(Coord::new(5, 0))),
            Err(IllegalAction::OutOfBounds(Coord::new(5, 0)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Expand(Coord::new(2, 2))),
            Err(IllegalAction::NotAdjacent(Coord::new(2, 2)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Expand(Coord::new(0, 0))),
            Err(IllegalAction::NotEmpty(Coord::new(0, 0)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Fortify(Coord::new(3, 3))),
            Err(IllegalAction::NotOwned(Coord::new(3, 3)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Attack(Coord::new(0, 1))),
            Err(IllegalAction::NotEnemy(Coord::new(0, 1)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Attack(Coord::new(3, 3))),
            Err(IllegalAction::NotAdjacent(Coord::new(3, 3)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Expand(Coord::new(0, 1))),
            Ok(())
        );
    }

    #[test]
    fn test_abandoned_shield_can_be_expanded_but_not_attacked() {
        let (rules, mut board, a, b) = setup();
        board.place_special(Coord::new(0, 1), SpecialItem::Shield);
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Attack(Coord::new(0, 1))),
            Err(IllegalAction::NotEnemy(Coord::new(0, 1)))
        );
        assert_eq!(
            rules.validate(&board, &a, &b, Action::Expand(Coord::new(0, 1))),
            Ok(())
        );
    }

    #[test]
    fn test_attack_roll_power_bonus_is_not_cumulative() {
        let (rules, _, mut a, _) = setup();
        let mut dice = ScriptedDice::new([3, 3, 3]);
        assert_eq!(rules.roll_attack(&a, &mut dice), 3);

        a.hold(Coord::new(0, 0), SpecialItem::PowerSource);
        assert_eq!(rules.roll_attack(&a, &mut dice), 4);

        a.claim(Coord::new(0, 1));
        a.hold(Coord::new(0, 1), SpecialItem::PowerSource);
        assert_eq!(rules.roll_attack(&a, &mut dice), 4);
    }

    #[test]
    fn test_defense_roll_modifiers() {
        let (rules, ..) = setup();
        let c = Coord::new(2, 2);
        let mut dice = ScriptedDice::new([2, 2, 2, 2, 2]);
        assert_eq!(rules.roll_defense(c, false, None, &mut dice), 2);
        assert_eq!(rules.roll_defense(c, true, None, &mut dice), 3);
        assert_eq!(rules.roll_defense(c, false, Some(c), &mut dice), 3);
        assert_eq!(rules.roll_defense(c, true, Some(c), &mut dice), 4);
        // Boost elsewhere does not help
        assert_eq!(rules.roll_defense(c, false, Some(Coord::new(2, 3)), &mut dice), 2);
    }

    #[test]
    fn test_rng_dice_stay_in_range() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let mut dice = RngDice(&mut rng);
        for _ in 0..1000 {
            let roll = dice.roll(6);
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_check_winner() {
        let config = GameConfig {
            victory_threshold: 3,
            ..GameConfig::default()
        };
        let rules = Rules::new(config);
        let mut a = Side::new(SideId::A, Coord::new(0, 0));
        let mut b = Side::new(SideId::B, Coord::new(4, 4));
        assert_eq!(rules.check_winner(&[a.clone(), b.clone()]), None);

        b.claim(Coord::new(4, 3));
        b.claim(Coord::new(3, 4));
        assert_eq!(rules.check_winner(&[a.clone(), b.clone()]), Some(SideId::B));

        a.claim(Coord::new(0, 1));
        a.claim(Coord::new(1, 0));
        assert_eq!(rules.check_winner(&[a, b]), Some(SideId::A));
    }
}
