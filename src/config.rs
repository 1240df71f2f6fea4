//! Game, negotiator and suggester configuration.
//!
//! Every tunable the rules depend on lives in [`GameConfig`] and is passed
//! explicitly to the rules engine and executor. [`Settings`] bundles the
//! three sections and can be loaded from a JSON file; missing fields fall
//! back to the reference values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest grid supported by the row-letter coordinate notation.
pub const MAX_GRID_SIZE: u8 = 26;

/// Rules tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid.
    pub grid_size: u8,
    /// Owned-cell count at which a side wins.
    pub victory_threshold: u16,
    /// Faces on each die; rolls are uniform in `1..=dice_sides`.
    pub dice_sides: u8,
    /// Attack bonus for holding at least one PowerSource.
    pub power_attack_bonus: u8,
    /// Defense bonus for a shielded cell.
    pub shield_defense_bonus: u8,
    /// Defense bonus for the MagicWell-boosted cell.
    pub magic_defense_bonus: u8,
    /// How many of each special item to scatter at game start.
    pub specials_per_kind: u8,
    /// Random coordinates tried per item before giving up on it.
    pub placement_attempts: u16,
    /// Turn cap for a session.
    pub max_turns: u32,
    /// Rejected candidates tolerated from a controller before a random
    /// legal move is played for it.
    pub max_rejections: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            victory_threshold: 13,
            dice_sides: 6,
            power_attack_bonus: 1,
            shield_defense_bonus: 1,
            magic_defense_bonus: 1,
            specials_per_kind: 2,
            placement_attempts: 100,
            max_turns: 200,
            max_rejections: 10,
        }
    }
}

impl GameConfig {
    /// Total number of cells on the board.
    #[must_use]
    pub fn cell_count(&self) -> u16 {
        u16::from(self.grid_size) * u16::from(self.grid_size)
    }

    /// Check that the values describe a playable game.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 || self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridSize(self.grid_size));
        }
        if self.victory_threshold < 2 || self.victory_threshold > self.cell_count() {
            return Err(ConfigError::VictoryThreshold {
                threshold: self.victory_threshold,
                cells: self.cell_count(),
            });
        }
        if self.dice_sides == 0 {
            return Err(ConfigError::DiceSides);
        }
        Ok(())
    }
}

/// Retry policy for the suggestion negotiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiatorConfig {
    /// Total suggestion attempts per turn (first try included).
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Skip straight to the fallback after a timeout or transport failure.
    pub abort_on_transport_failure: bool,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 500,
            abort_on_transport_failure: true,
        }
    }
}

impl NegotiatorConfig {
    /// Delay between attempts.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Connection settings for the HTTP suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggesterConfig {
    /// Base URL of an OpenAI-compatible server.
    pub base_url: String,
    /// Model name; omitted from the request when `None`.
    pub model: Option<String>,
    /// Environment variable holding the bearer token, if any.
    pub api_key_env: String,
    /// Completion length cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            model: None,
            api_key_env: "GRIDHOLD_API_KEY".to_string(),
            max_tokens: 64,
            temperature: 0.7,
            timeout_secs: 20,
        }
    }
}

impl SuggesterConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// All configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rules tunables.
    pub game: GameConfig,
    /// Negotiator retry policy.
    pub negotiator: NegotiatorConfig,
    /// Suggestion service connection.
    pub suggester: SuggesterConfig,
}

impl Settings {
    /// Parse settings from JSON text and validate the game section.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are unplayable.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.game.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}
