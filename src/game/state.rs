//! Game state management.

use rand::Rng;
use rand::seq::IteratorRandom;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{ConfigError, IllegalAction};
use crate::game::executor::execute;
use crate::game::{
    Action, Board, CellMark, Coord, Dice, Outcome, Rules, Side, SideId, scatter_specials,
};

/// A MagicWell defense boost covering one cell for one enemy turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WellBonus {
    /// Boosted cell.
    pub coord: Coord,
    /// Side that owns the cell and nominated it.
    pub beneficiary: SideId,
}

/// Complete game state.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Rules bound to this game's configuration.
    pub rules: Rules,
    /// Ownership grid and special overlay.
    pub board: Board,
    /// Ledgers indexed by [`SideId::index`].
    pub sides: [Side; 2],
    /// Active MagicWell boost, if any.
    pub well_bonus: Option<WellBonus>,
    /// Completed turns.
    pub turn: u32,
    /// Side whose turn it is.
    pub to_move: SideId,
}

impl GameState {
    /// Create a board with only the two seed cells claimed: A in the
    /// top-left corner, B in the bottom-right.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unplayable.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Board::new(config.grid_size).ok_or(ConfigError::GridSize(config.grid_size))?;

        let last = config.grid_size - 1;
        let seed_a = Coord::new(0, 0);
        let seed_b = Coord::new(last, last);
        board.set_mark(seed_a, CellMark::Owned(SideId::A));
        board.set_mark(seed_b, CellMark::Owned(SideId::B));

        Ok(Self {
            rules: Rules::new(config),
            board,
            sides: [Side::new(SideId::A, seed_a), Side::new(SideId::B, seed_b)],
            well_bonus: None,
            turn: 0,
            to_move: SideId::A,
        })
    }

    /// Create a game and scatter special items over empty cells.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unplayable.
    pub fn generate<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        let mut state = Self::new(config)?;
        let placed = scatter_specials(&mut state.board, &config, rng);
        info!(placed, "special items scattered");
        Ok(state)
    }

    /// The configuration in force.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        self.rules.config()
    }

    /// Ledger for a side.
    #[must_use]
    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id.index()]
    }

    /// Ledgers as `(actor, opponent)`.
    #[must_use]
    pub fn sides_for(&self, actor: SideId) -> (&Side, &Side) {
        (self.side(actor), self.side(actor.opponent()))
    }

    /// Every legal action for `actor` right now.
    #[must_use]
    pub fn legal_moves(&self, actor: SideId) -> Vec<Action> {
        let (own, enemy) = self.sides_for(actor);
        self.rules.legal_moves(&self.board, own, enemy)
    }

    /// Check an action for `actor` without applying it.
    ///
    /// # Errors
    ///
    /// Returns the failed precondition.
    pub fn validate(&self, actor: SideId, action: Action) -> Result<(), IllegalAction> {
        let (own, enemy) = self.sides_for(actor);
        self.rules.validate(&self.board, own, enemy, action)
    }

    /// Validate and apply an action.
    ///
    /// # Errors
    ///
    /// Returns the failed precondition; the state is left untouched.
    pub fn apply<D: Dice + ?Sized>(
        &mut self,
        actor: SideId,
        action: Action,
        dice: &mut D,
    ) -> Result<Outcome, IllegalAction> {
        execute(self, actor, action, dice)
    }

    /// The winner, if either side has reached the threshold.
    #[must_use]
    pub fn winner(&self) -> Option<SideId> {
        self.rules.check_winner(&self.sides)
    }

    /// Cell whose defense `defender` may boost this turn.
    #[must_use]
    pub fn boosted_for(&self, defender: SideId) -> Option<Coord> {
        self.well_bonus
            .filter(|bonus| bonus.beneficiary == defender)
            .map(|bonus| bonus.coord)
    }

    /// Start `side`'s turn.
    ///
    /// A bonus nominated by `side` has covered the enemy turn that just
    /// ended, so it expires here whether or not it was used.
    pub fn begin_turn(&mut self, side: SideId) {
        self.to_move = side;
        if let Some(bonus) = self.well_bonus {
            if bonus.beneficiary == side {
                debug!(coord = %bonus.coord, %side, "magic well bonus expired");
                self.well_bonus = None;
            }
        }
    }

    /// Set the MagicWell bonus at the end of `side`'s turn.
    ///
    /// Only a side holding at least one MagicWell is eligible. A nominated
    /// cell is used if `side` owns it; otherwise a cell is drawn uniformly
    /// from `side`'s territory, so an eligible side always gets its bonus.
    pub fn settle_well_bonus<R: Rng + ?Sized>(
        &mut self,
        side: SideId,
        nominated: Option<Coord>,
        rng: &mut R,
    ) -> Option<WellBonus> {
        let ledger = self.side(side);
        if !ledger.has_magic() {
            return None;
        }

        let coord = match nominated {
            Some(coord) if ledger.owns(coord) => coord,
            _ => {
                if let Some(coord) = nominated {
                    debug!(%coord, %side, "ignoring magic well target outside territory");
                }
                ledger.owned().iter().copied().choose(rng)?
            }
        };

        let bonus = WellBonus {
            coord,
            beneficiary: side,
        };
        info!(%coord, %side, "magic well bonus set");
        self.well_bonus = Some(bonus);
        Some(bonus)
    }

    /// Hand the move to the other side.
    pub fn end_turn(&mut self) {
        self.turn += 1;
        self.to_move = self.to_move.opponent();
    }
}
