//! CLI command implementations for Gridhold.

pub(crate) mod play;
pub(crate) mod simulate;

mod input;
mod output;

use clap::ValueEnum;
use gridhold::Settings;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Output format for `play` and `simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Who picks the moves for a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ControllerKind {
    /// Commands typed at the terminal.
    Human,
    /// Uniformly random legal moves.
    Random,
    /// Suggestions from the configured chat-completions service.
    Llm,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<gridhold::ConfigError> for CliError {
    fn from(e: gridhold::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<gridhold::SessionError> for CliError {
    fn from(e: gridhold::SessionError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Settings from `path`, or the defaults.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

/// The given seed, or one derived from the clock.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}

/// Execute the `rules` command.
pub(crate) fn rules(config: Option<PathBuf>) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
