//! Prompt text sent to the suggestion service.

#![allow(clippy::format_push_string)]

use crate::config::GameConfig;
use crate::game::{Action, Coord, GameState, SideId};
use crate::parse::WELL_TARGET_LABEL;
use crate::render::render_board;

/// Rules summary and the exact reply grammar.
#[must_use]
pub fn system_prompt(config: &GameConfig) -> String {
    let size = config.grid_size;
    let last_row = char::from(b'A' + size - 1);
    format!(
        "You are playing Gridhold, a territory game on a {size}x{size} grid. \
Rows are letters A-{last_row}, columns are numbers 1-{size}; B3 is row B, column 3.\n\
Each turn you take exactly one action:\n\
- EXPAND: claim an empty cell orthogonally adjacent to your territory.\n\
- FORTIFY: put a Shield on one of your unshielded cells (+{shield} defense). \
A PowerSource or MagicWell on that cell is destroyed.\n\
- ATTACK: contest an adjacent enemy cell. Both sides roll 1-{sides}; \
the attacker needs a strictly higher total. \
Holding a PowerSource adds +{power} to attacks.\n\
Expanding onto a PowerSource or MagicWell captures it. \
A side holding a MagicWell picks one of its cells to get +{magic} defense during the next enemy turn.\n\
The first side to own {threshold} cells wins.\n\n\
Reply with exactly one line of the form ACTION: CELL, for example EXPAND: B2. \
If you hold a MagicWell after your move you may add a second line {WELL_TARGET_LABEL}: CELL \
naming one of your cells. Do not write anything else.",
        shield = config.shield_defense_bonus,
        sides = config.dice_sides,
        power = config.power_attack_bonus,
        magic = config.magic_defense_bonus,
        threshold = config.victory_threshold,
    )
}

fn coord_list<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> String {
    let list: Vec<String> = coords.into_iter().map(ToString::to_string).collect();
    if list.is_empty() {
        "none".to_string()
    } else {
        list.join(", ")
    }
}

/// The position as `side` sees it, with its legal moves.
#[must_use]
pub fn describe_state(state: &GameState, side: SideId, legal: &[Action]) -> String {
    let mut text = format!(
        "You are side {side} ({}). Turn {}.\n\n",
        side.mark(),
        state.turn + 1
    );
    text.push_str(&render_board(&state.board, state.well_bonus));
    text.push('\n');

    for id in [side, side.opponent()] {
        let ledger = state.side(id);
        let who = if id == side { "Your" } else { "Enemy" };
        text.push_str(&format!(
            "{who} cells ({}/{}): {}\n",
            ledger.territory(),
            state.config().victory_threshold,
            coord_list(ledger.owned())
        ));
        text.push_str(&format!(
            "{who} PowerSources: {}\n",
            coord_list(ledger.power_sources())
        ));
        text.push_str(&format!(
            "{who} MagicWells: {}\n",
            coord_list(ledger.magic_wells())
        ));
    }

    let mut loose: Vec<String> = state
        .board
        .specials()
        .map(|(coord, item)| format!("{item:?} at {coord}"))
        .collect();
    loose.sort();
    if !loose.is_empty() {
        text.push_str(&format!("Items on the board: {}\n", loose.join(", ")));
    }

    if let Some(bonus) = state.well_bonus {
        text.push_str(&format!(
            "Active MagicWell bonus: {} for side {}\n",
            bonus.coord, bonus.beneficiary
        ));
    }

    text.push_str("\nLegal moves:\n");
    for action in legal {
        text.push_str(&format!("{action}\n"));
    }

    if state.side(side).has_magic() {
        text.push_str(&format!(
            "\nYou hold a MagicWell. Add a second line {WELL_TARGET_LABEL}: CELL to choose the cell to protect.\n"
        ));
    }

    text
}

/// Follow-up text after a rejected attempt.
#[must_use]
pub fn rejection_feedback(reason: &str) -> String {
    format!(
        "Your previous reply was rejected: {reason}. \
Reply with exactly one of the legal moves listed above."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SpecialItem;

    #[test]
    fn test_system_prompt_mentions_grammar_and_config() {
        let config = GameConfig::default();
        let prompt = system_prompt(&config);
        assert!(prompt.contains("5x5"));
        assert!(prompt.contains("A-E"));
        assert!(prompt.contains("ACTION: CELL"));
        assert!(prompt.contains("WELL_TARGET: CELL"));
        assert!(prompt.contains("own 13 cells"));
    }

    #[test]
    fn test_describe_state_lists_legal_moves() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let legal = state.legal_moves(SideId::A);
        let text = describe_state(&state, SideId::A, &legal);

        assert!(text.starts_with("You are side A (X). Turn 1."));
        assert!(text.contains("Your cells (1/13): A1"));
        assert!(text.contains("Enemy cells (1/13): E5"));
        for action in &legal {
            assert!(text.contains(&action.to_string()));
        }
        assert!(!text.contains("You hold a MagicWell"));
    }

    #[test]
    fn test_describe_state_notes_magic_and_items() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.sides[0].hold(Coord::new(0, 0), SpecialItem::MagicWell);
        state
            .board
            .place_special(Coord::new(2, 2), SpecialItem::PowerSource);

        let text = describe_state(&state, SideId::A, &[]);
        assert!(text.contains("Your MagicWells: A1"));
        assert!(text.contains("PowerSource at C3"));
        assert!(text.contains("You hold a MagicWell"));
    }

    #[test]
    fn test_rejection_feedback_carries_reason() {
        let text = rejection_feedback("B3 is not adjacent to your territory");
        assert!(text.contains("B3 is not adjacent"));
    }
}
