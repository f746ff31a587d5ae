// ⚙️ Application configuration - settings as data
// Every field has a default, so an empty `{}` file is a valid config.

use crate::activity::DEFAULT_EVENT_CAPACITY;
use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_log_file() -> PathBuf {
    PathBuf::from("customer_ledger.log")
}

fn default_cancel_token() -> String {
    "q".to_string()
}

fn default_actor() -> String {
    "cli".to_string()
}

fn default_activity_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the tracing subscriber writes
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Path offered when saving/loading without typing one
    #[serde(default)]
    pub default_snapshot: Option<PathBuf>,

    /// Escape sentinel on text prompts (compared case-insensitively)
    #[serde(default = "default_cancel_token")]
    pub cancel_token: String,

    /// Recorded as the actor of every activity event
    #[serde(default = "default_actor")]
    pub actor: String,

    /// Activity events kept in memory; older ones are dropped
    #[serde(default = "default_activity_capacity")]
    pub activity_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_file: default_log_file(),
            default_snapshot: None,
            cancel_token: default_cancel_token(),
            actor: default_actor(),
            activity_capacity: default_activity_capacity(),
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cancel_token.trim().is_empty() {
            bail!("cancel_token must not be empty");
        }
        if self.cancel_token.trim().contains(char::is_whitespace) {
            bail!("cancel_token must be a single word");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
