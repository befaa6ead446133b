//! Dispatch service - validates, renders and executes one instruction

use crate::core::config::DispatchConfig;
use crate::core::error::{DispatchError, Result};
use crate::dispatch::process;
use crate::registry::{self, ParameterSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Per-request lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Rendered,
    Executing,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Rendered => "rendered",
            Stage::Executing => "executing",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub session_id: String,
    /// Rendered command line, as reported to the caller
    pub command: String,
    /// Trimmed standard output of the child process
    pub output: String,
}

/// Runs instructions as isolated child processes
///
/// Holds no per-request state; concurrent calls to [`Dispatcher::execute`]
/// are independent of one another.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tool: Vec<String>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            tool: config.tool.clone(),
            timeout: config.command_timeout(),
        }
    }

    /// Validate, render and run one instruction
    ///
    /// Short-circuits on the first failure: missing session, unknown
    /// instruction, invalid parameters, then execution errors.
    pub async fn execute(
        &self,
        instruction: &str,
        params: &ParameterSet,
        session_id: Option<&str>,
    ) -> Result<ExecutionResult> {
        let span = tracing::info_span!(
            "dispatch",
            session_id = session_id.unwrap_or(""),
            instruction = instruction
        );
        let started = Instant::now();

        let result = self
            .run_stages(instruction, params, session_id)
            .instrument(span.clone())
            .await;

        let _enter = span.enter();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(done) => tracing::info!(
                stage = %Stage::Completed,
                command = %done.command,
                elapsed_ms,
                "dispatch completed"
            ),
            Err(e) => tracing::warn!(
                stage = %Stage::Failed,
                code = e.code(),
                elapsed_ms,
                error = %e,
                "dispatch failed"
            ),
        }
        result
    }

    async fn run_stages(
        &self,
        instruction: &str,
        params: &ParameterSet,
        session_id: Option<&str>,
    ) -> Result<ExecutionResult> {
        tracing::debug!(stage = %Stage::Received, "request received");

        // Blank ids are rejected, but the id is echoed back exactly as sent.
        let session_id = session_id
            .filter(|s| !s.trim().is_empty())
            .ok_or(DispatchError::MissingSession)?;

        let instruction: registry::Instruction = instruction.parse()?;
        let validated = registry::validate(instruction, params)?;
        tracing::debug!(stage = %Stage::Validated, "parameters validated");

        let command = validated.render();
        tracing::debug!(stage = %Stage::Rendered, command = %command, "command rendered");

        tracing::debug!(stage = %Stage::Executing, "spawning child process");
        let output = process::run(&self.tool, &command, self.timeout).await?;

        Ok(ExecutionResult {
            session_id: session_id.to_string(),
            command: command.to_string(),
            output,
        })
    }
}
