//! Child process execution for rendered commands
//!
//! The command is launched from an explicit argument vector; no shell is
//! involved, so parameter values are never re-tokenized or expanded.

use crate::core::error::{DispatchError, Result};
use crate::registry::RenderedCommand;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Run `command` with its program replaced by `tool`, returning trimmed stdout
///
/// Both output streams are drained fully before the child is released.
/// When `limit` elapses the child is killed and `Timeout` is returned.
pub async fn run(
    tool: &[String],
    command: &RenderedCommand,
    limit: Option<Duration>,
) -> Result<String> {
    let (program, prefix) = tool
        .split_first()
        .ok_or_else(|| DispatchError::Config("tool must name a program".into()))?;

    let mut cmd = Command::new(program);
    cmd.args(prefix)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        DispatchError::CommandFailed(format!("Failed to launch '{}': {}", program, e))
    })?;

    let output = match limit {
        Some(limit) => match timeout(limit, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DispatchError::Timeout {
                    command: command.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                })
            }
        },
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            format!("'{}' exited with {}", command, output.status)
        } else {
            stderr
        };
        return Err(DispatchError::CommandFailed(detail));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
