use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::transport::DEFAULT_ENDPOINT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap on dispatch rounds per query. `None` leaves the loop unbounded.
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_rounds: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl AgentConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AgentError::Config(format!("failed to read configuration: {err}")))?;
        let cfg: Self = toml::from_str(&raw)
            .map_err(|err| AgentError::Config(format!("failed to parse configuration: {err}")))?;
        Ok(cfg)
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Environment overrides; unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = env::var("TOOLBRIDGE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("TOOLBRIDGE_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                self.timeout_secs = parsed;
            }
        }
        if let Ok(rounds) = env::var("TOOLBRIDGE_MAX_ROUNDS") {
            if let Ok(parsed) = rounds.parse::<usize>() {
                self.max_rounds = Some(parsed);
            }
        }
    }
}
