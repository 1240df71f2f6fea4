//! Plain-text board rendering.
//!
//! Each cell is three characters: the owner glyph (`.` when empty), the
//! special-item glyph, and `*` when the cell carries the active MagicWell
//! bonus.
//!
//! ```text
//!    1   2   3   4   5
//! A  X   XS  .   .P  .
//! B  .   .   .M  .   .
//! ```

#![allow(clippy::format_push_string)]

use crate::game::{Board, CellMark, GameState, SideId, WellBonus};

/// Render the board grid.
#[must_use]
pub fn render_board(board: &Board, bonus: Option<WellBonus>) -> String {
    let size = board.size();
    let mut output = String::from("   ");

    for col in 1..=size {
        output.push_str(&format!("{col:<4}"));
    }
    end_line(&mut output);

    for (coord, mark) in board.iter() {
        if coord.col == 0 {
            output.push(char::from(b'A' + coord.row));
            output.push_str("  ");
        }

        output.push(match mark {
            CellMark::Empty => '.',
            CellMark::Owned(side) => side.mark(),
        });
        output.push(board.special(coord).map_or(' ', |item| item.glyph()));
        output.push(if bonus.is_some_and(|b| b.coord == coord) {
            '*'
        } else {
            ' '
        });
        output.push(' ');

        if coord.col + 1 == size {
            end_line(&mut output);
        }
    }

    output
}

fn end_line(output: &mut String) {
    let trimmed = output.trim_end_matches(' ').len();
    output.truncate(trimmed);
    output.push('\n');
}

/// One status line per side: territory, held items and the win target.
#[must_use]
pub fn render_status(state: &GameState) -> String {
    let mut output = String::new();
    let threshold = state.config().victory_threshold;

    for id in SideId::BOTH {
        let side = state.side(id);
        output.push_str(&format!(
            "Side {id} ({}): {}/{threshold} cells, {} power, {} magic\n",
            id.mark(),
            side.territory(),
            side.power_sources().len(),
            side.magic_wells().len(),
        ));
    }

    if let Some(bonus) = state.well_bonus {
        output.push_str(&format!(
            "Magic well bonus: {} for side {}\n",
            bonus.coord, bonus.beneficiary
        ));
    }

    output
}

/// Board followed by the status lines.
#[must_use]
pub fn render_state(state: &GameState) -> String {
    let mut output = render_board(&state.board, state.well_bonus);
    output.push('\n');
    output.push_str(&render_status(state));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Coord, SpecialItem};

    #[test]
    fn test_render_fresh_board() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let text = render_board(&state.board, None);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "   1   2   3   4   5");
        assert_eq!(lines[1], "A  X   .   .   .   .");
        assert_eq!(lines[5], "E  .   .   .   .   O");
    }

    #[test]
    fn test_render_specials_and_bonus() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.board.place_special(Coord::new(0, 0), SpecialItem::Shield);
        state.board.place_special(Coord::new(0, 2), SpecialItem::PowerSource);
        let bonus = WellBonus {
            coord: Coord::new(0, 0),
            beneficiary: SideId::A,
        };
        let text = render_board(&state.board, Some(bonus));
        assert_eq!(text.lines().nth(1), Some("A  XS* .   .P  .   ."));
    }

    #[test]
    fn test_render_status() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let text = render_status(&state);
        assert!(text.contains("Side A (X): 1/13 cells, 0 power, 0 magic"));
        assert!(text.contains("Side B (O): 1/13 cells"));
    }
}
