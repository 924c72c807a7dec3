//! Deadline-bounded execution of external tools.

use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Bytes of stderr kept in a failure message.
const STDERR_TAIL_BYTES: usize = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("{operation} failed ({status}): {stderr}")]
    Failed {
        operation: &'static str,
        status: String,
        stderr: String,
    },

    #[error("{operation} produced unusable output: {message}")]
    InvalidOutput {
        operation: &'static str,
        message: String,
    },
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}

/// Run `command` to completion, killing it if it outlives `deadline`.
///
/// A non-zero exit status is reported as [`ToolError::Failed`] with the tail of
/// stderr attached.
pub async fn run_tool(
    mut command: Command,
    operation: &'static str,
    deadline: Duration,
) -> Result<Output, ToolError> {
    let program = command.as_std().get_program().to_string_lossy().to_string();
    let start = Instant::now();

    command
        .kill_on_drop(true)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?,
        Err(_) => {
            tracing::warn!(
                program = %program,
                operation,
                timeout_secs = deadline.as_secs(),
                "External tool exceeded its deadline and was killed"
            );
            return Err(ToolError::TimedOut {
                operation,
                timeout: deadline,
            });
        }
    };

    tracing::debug!(
        program = %program,
        operation,
        duration_ms = start.elapsed().as_millis(),
        status = %output.status,
        "External tool finished"
    );

    if !output.status.success() {
        return Err(ToolError::Failed {
            operation,
            status: output.status.to_string(),
            stderr: stderr_tail(&output.stderr),
        });
    }

    Ok(output)
}
