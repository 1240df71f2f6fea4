//! Output formatting utilities for CLI.

#![allow(clippy::format_push_string, clippy::cast_precision_loss)]

use gridhold::game::{Outcome, SideId};
use gridhold::session::{EndReason, GameSummary, TurnOutcome, TurnReport};
use serde::Serialize;

/// One-line narration of a turn.
pub(super) fn format_turn(report: &TurnReport, name: &str) -> String {
    let mut line = format!("Turn {:>3}  {} ({name}): ", report.turn, report.side);

    match report.outcome {
        TurnOutcome::Skipped => line.push_str("no legal moves, turn skipped"),
        TurnOutcome::Played {
            action,
            outcome,
            fallback,
            rejections,
        } => {
            line.push_str(&action.to_string());
            line.push_str(" -> ");
            line.push_str(&describe_outcome(&outcome));
            if fallback {
                line.push_str(" [random fallback]");
            }
            if rejections > 0 {
                line.push_str(&format!(" [{rejections} rejected]"));
            }
        }
    }

    if let Some(bonus) = report.well_bonus {
        line.push_str(&format!("; MagicWell protects {}", bonus.coord));
    }
    line
}

fn describe_outcome(outcome: &Outcome) -> String {
    match *outcome {
        Outcome::Expanded { captured, .. } => match captured {
            Some(item) => format!("claimed, captured {item:?}"),
            None => "claimed".to_string(),
        },
        Outcome::Fortified { destroyed, .. } => match destroyed {
            Some(item) => format!("shielded, destroyed {item:?}"),
            None => "shielded".to_string(),
        },
        Outcome::Captured {
            roll,
            seized,
            shield_destroyed,
            ..
        } => {
            let mut text = format!("captured ({} vs {})", roll.attack, roll.defense);
            if let Some(item) = seized {
                text.push_str(&format!(", seized {item:?}"));
            }
            if shield_destroyed {
                text.push_str(", shield destroyed");
            }
            text
        }
        Outcome::Repelled { roll, .. } => {
            format!("repelled ({} vs {})", roll.attack, roll.defense)
        }
    }
}

/// Format a game summary as human-readable text.
pub(super) fn format_summary_text(summary: &GameSummary, seed: u64) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {seed})\n"));
    match (summary.winner, summary.reason) {
        (Some(winner), _) => {
            let name = &summary.names[winner.index()];
            output.push_str(&format!("  Winner: Side {winner} ({name})\n"));
        }
        (None, EndReason::Stalemate) => output.push_str("  Result: Stalemate\n"),
        (None, _) => output.push_str("  Result: Turn limit reached\n"),
    }
    output.push_str(&format!("  Turns: {}\n\n", summary.turns));

    for side in SideId::BOTH {
        let i = side.index();
        output.push_str(&format!(
            "  Side {side} ({}): {} cells",
            summary.names[i], summary.territory[i]
        ));
        if summary.fallbacks[i] > 0 {
            output.push_str(&format!(", {} random fallbacks", summary.fallbacks[i]));
        }
        output.push('\n');

        if let Some(stats) = summary.negotiation[i] {
            output.push_str(&format!(
                "    suggestions: {} accepted, {} fallbacks over {} requests \
({} unparseable, {} illegal, {} transport failures)\n",
                stats.resolved,
                stats.fallbacks,
                stats.requests,
                stats.parse_failures,
                stats.illegal_suggestions,
                stats.transport_failures
            ));
        }
    }

    output
}

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult<'a> {
    /// Random seed used.
    pub(super) seed: u64,
    /// Session summary.
    #[serde(flatten)]
    pub(super) summary: &'a GameSummary,
}

/// Simulation statistics for aggregated results.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct SimulationStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Win count per side.
    pub(super) wins: [u64; 2],
    /// Games that hit the turn limit.
    pub(super) turn_limits: u64,
    /// Games where neither side could move.
    pub(super) stalemates: u64,
    /// Games aborted by an error.
    pub(super) errors: u64,
    /// Total turns across all games.
    total_turns: u64,
    /// Total final territory per side.
    total_territory: [u64; 2],
}

impl SimulationStats {
    /// Add a finished game to the stats.
    pub(super) fn add_summary(&mut self, summary: &GameSummary) {
        self.games_played += 1;
        self.total_turns += u64::from(summary.turns);

        match (summary.winner, summary.reason) {
            (Some(winner), _) => self.wins[winner.index()] += 1,
            (None, EndReason::Stalemate) => self.stalemates += 1,
            (None, _) => self.turn_limits += 1,
        }

        for side in SideId::BOTH {
            self.total_territory[side.index()] += summary.territory[side.index()] as u64;
        }
    }

    /// Count a game that ended in an error.
    pub(super) fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Combine stats from another worker.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.turn_limits += other.turn_limits;
        self.stalemates += other.stalemates;
        self.errors += other.errors;
        self.total_turns += other.total_turns;
        for i in 0..2 {
            self.wins[i] += other.wins[i];
            self.total_territory[i] += other.total_territory[i];
        }
    }

    /// Win rate for a side (0.0-1.0).
    pub(super) fn win_rate(&self, side: SideId) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins[side.index()] as f64 / self.games_played as f64
    }

    /// Average final territory for a side.
    pub(super) fn avg_territory(&self, side: SideId) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_territory[side.index()] as f64 / self.games_played as f64
    }

    /// Average game length.
    pub(super) fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }
}

/// JSON-serializable simulation result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulationResult {
    games_played: u64,
    sides: Vec<JsonSimulationSide>,
    turn_limits: u64,
    stalemates: u64,
    errors: u64,
    avg_turns: f64,
}

/// JSON-serializable per-side simulation stats.
#[derive(Debug, Serialize)]
struct JsonSimulationSide {
    side: SideId,
    wins: u64,
    win_rate: f64,
    avg_territory: f64,
}

impl JsonSimulationResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &SimulationStats) -> Self {
        let sides = SideId::BOTH
            .into_iter()
            .map(|side| JsonSimulationSide {
                side,
                wins: stats.wins[side.index()],
                win_rate: stats.win_rate(side),
                avg_territory: stats.avg_territory(side),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            sides,
            turn_limits: stats.turn_limits,
            stalemates: stats.stalemates,
            errors: stats.errors,
            avg_turns: stats.avg_turns(),
        }
    }
}

/// Format simulation stats as human-readable text.
pub(super) fn format_simulation_text(stats: &SimulationStats) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Simulation Results ({} games)\n",
        stats.games_played
    ));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for side in SideId::BOTH {
        output.push_str(&format!(
            "  Side {side}: {:.1}% ({} wins, {:.1} cells on average)\n",
            stats.win_rate(side) * 100.0,
            stats.wins[side.index()],
            stats.avg_territory(side)
        ));
    }
    output.push_str(&format!("  Turn limit: {}\n", stats.turn_limits));
    output.push_str(&format!("  Stalemates: {}\n", stats.stalemates));
    if stats.errors > 0 {
        output.push_str(&format!("  Errors: {}\n", stats.errors));
    }

    output.push_str(&format!(
        "\nAverage Game Length: {:.0} turns\n",
        stats.avg_turns()
    ));

    output
}
