//! Single-file snippet execution on the host process (node or python3).

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

use super::{capture_with_timeout, truncate_utf8};

/// Cap on each captured stream.
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

/// Write the snippet into a fresh scratch directory, run it with a
/// wall-clock timeout, and remove the directory on every exit path.
pub async fn run_snippet(code: &str, language: Option<&str>, limit: Duration) -> Result<SnippetOutcome> {
    let (program, file_name) = match language {
        Some("python") => ("python3", "main.py"),
        _ => ("node", "main.js"),
    };

    let scratch = std::env::temp_dir().join(format!("vipudev-run-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&scratch)
        .await
        .context("Failed to create scratch directory")?;

    let result = run_in_scratch(&scratch, program, file_name, code, limit).await;

    if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
        debug!("Scratch cleanup failed for {}: {}", scratch.display(), e);
    }
    result
}

async fn run_in_scratch(
    scratch: &Path,
    program: &str,
    file_name: &str,
    code: &str,
    limit: Duration,
) -> Result<SnippetOutcome> {
    let file_path = scratch.join(file_name);
    tokio::fs::write(&file_path, code)
        .await
        .context("Failed to write snippet")?;

    debug!("Running {} {}", program, file_path.display());
    let child = Command::new(program)
        .arg(&file_path)
        .current_dir(scratch)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;

    let mut capture = capture_with_timeout(child, limit).await;
    truncate_utf8(&mut capture.stdout, MAX_OUTPUT_BYTES);
    truncate_utf8(&mut capture.stderr, MAX_OUTPUT_BYTES);

    Ok(SnippetOutcome {
        stdout: capture.stdout,
        stderr: capture.stderr,
        exit_code: capture.exit_code,
        timed_out: capture.timed_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // These exercise real interpreters; run with `cargo test -- --ignored`
    // on a machine that has node and python3 installed.

    #[tokio::test]
    #[ignore]
    async fn node_snippet_captures_stdout() {
        let outcome = run_snippet("console.log(1)", None, Duration::from_secs(7))
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.stdout.contains('1'));
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    #[ignore]
    async fn runaway_snippet_is_killed() {
        let outcome = run_snippet("while(true){}", None, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, None);
    }

    #[tokio::test]
    async fn unknown_interpreter_is_an_error() {
        let err = run_snippet("print(1)", Some("python"), Duration::from_secs(1)).await;
        // python3 may or may not exist here; only assert when it is absent.
        if let Err(e) = err {
            assert!(e.to_string().contains("python3"));
        }
    }
}
