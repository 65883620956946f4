//! Code execution: a host runner for single snippets, a container runner for
//! multi-file projects, and ZIP archive helpers. Each invocation gets its own
//! uniquely named scratch directory, removed on every exit path.

pub mod archive;
pub mod container;
pub mod host;

pub use container::{sanitize_rel_path, ContainerOutcome, ContainerRunner, SubmittedFile};
pub use host::{run_snippet, SnippetOutcome};

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::warn;

pub(crate) struct ProcessCapture {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

/// Wait for a spawned child, force-killing it once the wall-clock limit
/// passes. Output is drained concurrently so a chatty child cannot block on
/// a full pipe; a killed child reports no exit code.
pub(crate) async fn capture_with_timeout(mut child: Child, limit: Duration) -> ProcessCapture {
    let stdout_task = child.stdout.take().map(|s| tokio::spawn(read_stream(s)));
    let stderr_task = child.stderr.take().map(|s| tokio::spawn(read_stream(s)));

    let (exit_code, timed_out) = match tokio::time::timeout(limit, child.wait()).await {
        Ok(Ok(status)) => (status.code(), false),
        Ok(Err(e)) => {
            warn!("Failed waiting on sandbox process: {}", e);
            (None, false)
        }
        Err(_) => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill timed-out sandbox process: {}", e);
            }
            (None, true)
        }
    };

    let stdout = match stdout_task {
        Some(task) => task.await.unwrap_or_default(),
        None => Vec::new(),
    };
    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => Vec::new(),
    };

    ProcessCapture {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
        timed_out,
    }
}

async fn read_stream<R: AsyncRead + Unpin>(mut stream: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf).await;
    buf
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
pub(crate) fn truncate_utf8(s: &mut String, max: usize) {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
}
