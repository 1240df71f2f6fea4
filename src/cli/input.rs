//! Terminal controller for a human side.

use gridhold::game::{Action, Coord, GameState, SideId};
use gridhold::parse::parse_human_command;
use gridhold::render::render_state;
use gridhold::session::{Controller, SessionError};
use gridhold::IllegalAction;
use rand::RngCore;
use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::rc::Rc;
use tracing::warn;

const HELP: &str = "Commands: E <cell> expand (C also works), F <cell> fortify, \
A <cell> attack, ? lists legal moves, Q quits.";

/// Line input shared by every human side in a game.
///
/// Stdin can only be locked once per thread, so two human sides must read
/// through the same handle.
pub(crate) type SharedInput<I> = Rc<RefCell<I>>;

/// Locked stdin, shareable between controllers.
pub(crate) fn shared_stdin() -> SharedInput<StdinLock<'static>> {
    Rc::new(RefCell::new(io::stdin().lock()))
}

/// Reads commands line by line and re-prompts until one is legal.
pub(crate) struct HumanController<I, O> {
    name: String,
    input: SharedInput<I>,
    output: O,
}

impl HumanController<StdinLock<'static>, Stdout> {
    /// Controller on the shared stdin and stdout.
    pub(crate) fn stdio(name: impl Into<String>, input: SharedInput<StdinLock<'static>>) -> Self {
        Self::new(name, input, io::stdout())
    }
}

impl<I: BufRead, O: Write> HumanController<I, O> {
    pub(crate) fn new(name: impl Into<String>, input: SharedInput<I>, output: O) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }

    /// Next line with surrounding whitespace removed; `None` on EOF.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    #[cfg(test)]
    fn into_output(self) -> O {
        self.output
    }
}

fn is_quit(line: &str) -> bool {
    line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit")
}

impl<I: BufRead, O: Write> Controller for HumanController<I, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(
        &mut self,
        state: &GameState,
        side: SideId,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<Action>, SessionError> {
        writeln!(self.output, "\n{}", render_state(state))?;
        writeln!(self.output, "{HELP}")?;

        loop {
            write!(self.output, "Side {side} ({}) > ", side.mark())?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Err(SessionError::Abandoned(side));
            };
            if line.is_empty() {
                continue;
            }
            if is_quit(&line) {
                return Err(SessionError::Abandoned(side));
            }
            if line == "?" {
                let moves: Vec<String> = state
                    .legal_moves(side)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                writeln!(self.output, "{}", moves.join(", "))?;
                continue;
            }

            let action = match parse_human_command(&line, state.board.size()) {
                Ok(action) => action,
                Err(e) => {
                    writeln!(self.output, "{e}")?;
                    continue;
                }
            };
            match state.validate(side, action) {
                Ok(()) => return Ok(Some(action)),
                Err(e) => writeln!(self.output, "Illegal: {e}")?,
            }
        }
    }

    fn rejected(&mut self, action: Action, reason: &IllegalAction) {
        if let Err(e) = writeln!(self.output, "{action} rejected: {reason}") {
            warn!(name = %self.name, error = %e, "failed to report rejected action");
        }
    }

    fn choose_well_target(
        &mut self,
        state: &GameState,
        side: SideId,
        _rng: &mut dyn RngCore,
    ) -> Result<Option<Coord>, SessionError> {
        loop {
            write!(
                self.output,
                "You hold a MagicWell. Cell to protect next turn (blank for random) > "
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Err(SessionError::Abandoned(side));
            };
            if line.is_empty() {
                return Ok(None);
            }
            if is_quit(&line) {
                return Err(SessionError::Abandoned(side));
            }

            match Coord::parse(&line, state.board.size()) {
                Ok(coord) if state.side(side).owns(coord) => return Ok(Some(coord)),
                Ok(coord) => writeln!(self.output, "{coord} is not yours")?,
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridhold::GameConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::io::Cursor;

    type Script = SharedInput<Cursor<Vec<u8>>>;

    fn script(text: &str) -> Script {
        Rc::new(RefCell::new(Cursor::new(text.as_bytes().to_vec())))
    }

    fn controller(text: &str) -> HumanController<Cursor<Vec<u8>>, Vec<u8>> {
        HumanController::new("human", script(text), Vec::new())
    }

    #[test]
    fn test_reprompts_until_legal() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut human = controller("\nexpand b1\nE C3\n?\ne b1\n");

        let action = human.choose_action(&state, SideId::A, &mut rng).unwrap();
        assert_eq!(action, Some(Action::Expand(Coord::new(1, 0))));

        let output = String::from_utf8(human.into_output()).unwrap();
        assert!(output.contains("unknown action 'expand'"));
        assert!(output.contains("Illegal: C3 is not adjacent to your territory"));
        assert!(output.contains("EXPAND: A2"));
    }

    #[test]
    fn test_quit_and_eof_abandon() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for script in ["q\n", "QUIT\n", ""] {
            let mut human = controller(script);
            let result = human.choose_action(&state, SideId::B, &mut rng);
            assert!(matches!(result, Err(SessionError::Abandoned(SideId::B))));
        }
    }

    #[test]
    fn test_well_target_prompt() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut human = controller("E5\nZZ\na1\n");
        let target = human
            .choose_well_target(&state, SideId::A, &mut rng)
            .unwrap();
        assert_eq!(target, Some(Coord::new(0, 0)));
        let output = String::from_utf8(human.into_output()).unwrap();
        assert!(output.contains("E5 is not yours"));

        let mut human = controller("\n");
        let target = human
            .choose_well_target(&state, SideId::A, &mut rng)
            .unwrap();
        assert_eq!(target, None);
    }

    #[test]
    fn test_two_humans_share_one_input() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let input = script("E B1\nE D5\nF A1\n");
        let mut a = HumanController::new("alice", Rc::clone(&input), Vec::new());
        let mut b = HumanController::new("bob", Rc::clone(&input), Vec::new());

        let first = a.choose_action(&state, SideId::A, &mut rng).unwrap();
        assert_eq!(first, Some(Action::Expand(Coord::new(1, 0))));
        let second = b.choose_action(&state, SideId::B, &mut rng).unwrap();
        assert_eq!(second, Some(Action::Expand(Coord::new(3, 4))));
        let third = a.choose_action(&state, SideId::A, &mut rng).unwrap();
        assert_eq!(third, Some(Action::Fortify(Coord::new(0, 0))));

        // Both sides ran the input dry.
        assert!(matches!(
            b.choose_action(&state, SideId::B, &mut rng),
            Err(SessionError::Abandoned(SideId::B))
        ));
    }

    #[test]
    fn test_rejection_is_reported() {
        let mut human = controller("");
        human.rejected(
            Action::Attack(Coord::new(2, 2)),
            &IllegalAction::NotEnemy(Coord::new(2, 2)),
        );
        let output = String::from_utf8(human.into_output()).unwrap();
        assert!(output.contains("ATTACK: C3 rejected: C3 is not held by the enemy"));
    }
}
