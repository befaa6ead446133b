//! Dispatch server configuration
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags in the server binary.

use crate::core::error::{DispatchError, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Configuration for the dispatch service and its HTTP listener
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Address the HTTP listener binds to
    pub listen: SocketAddr,

    /// Argument vector that replaces the rendered program name
    ///
    /// Rendered commands always read `kubectl ...`; the executed process is
    /// `tool[0] tool[1..] <rendered args>`. Use this to pin a context or
    /// kubeconfig, e.g. `["kubectl", "--context", "staging"]`.
    pub tool: Vec<String>,

    /// Upper bound on a single child process, in milliseconds
    ///
    /// `0` disables the bound and waits for the child indefinitely.
    pub command_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            tool: vec!["kubectl".to_string()],
            command_timeout_ms: 30_000,
        }
    }
}

impl DispatchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DispatchError::Config(e.to_string()))
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Child process bound, or `None` when unbounded
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_ms > 0).then(|| Duration::from_millis(self.command_timeout_ms))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        match self.tool.first() {
            None => Err(DispatchError::Config("tool must name a program".into())),
            Some(program) if program.trim().is_empty() => {
                Err(DispatchError::Config("tool program must not be empty".into()))
            }
            Some(_) => Ok(()),
        }
    }
}
