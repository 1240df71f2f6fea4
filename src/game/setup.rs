//! Special-item placement at game start.

use rand::Rng;
use tracing::warn;

use crate::config::GameConfig;
use crate::game::{Board, CellMark, Coord, SpecialItem};

/// Scatter `specials_per_kind` of each item onto empty, item-free cells.
///
/// Each item samples random coordinates until one fits or
/// `placement_attempts` runs out; an item that finds no cell is skipped.
/// Returns how many items were placed.
pub fn scatter_specials<R: Rng + ?Sized>(board: &mut Board, config: &GameConfig, rng: &mut R) -> usize {
    let size = board.size();
    let mut placed = 0;

    for item in SpecialItem::ALL {
        for _ in 0..config.specials_per_kind {
            let spot = (0..config.placement_attempts)
                .map(|_| Coord::new(rng.gen_range(0..size), rng.gen_range(0..size)))
                .find(|&coord| {
                    board.mark(coord) == Some(CellMark::Empty) && board.special(coord).is_none()
                });

            match spot {
                Some(coord) => {
                    board.place_special(coord, item);
                    placed += 1;
                }
                None => {
                    warn!(
                        ?item,
                        attempts = config.placement_attempts,
                        "no free cell found for special item"
                    );
                }
            }
        }
    }

    placed
}
