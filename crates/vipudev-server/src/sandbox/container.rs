//! Multi-file project execution inside a resource-limited container. One
//! container process per request: stage files, run, collect output, clean up.
//! No retries, no queueing, no shared quota across concurrent invocations.

use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use super::capture_with_timeout;
use crate::config::Config;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub image_used: String,
    pub command_run: String,
}

pub struct ContainerRunner {
    docker_bin: String,
    limit: Duration,
    memory_limit: String,
    cpu_limit: String,
}

impl ContainerRunner {
    pub fn new(limit: Duration, memory_limit: String, cpu_limit: String) -> Self {
        Self {
            docker_bin: "docker".to_string(),
            limit,
            memory_limit,
            cpu_limit,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            Duration::from_secs(cfg.sandbox_timeout_seconds),
            cfg.sandbox_memory_limit.clone(),
            cfg.sandbox_cpu_limit.clone(),
        )
    }

    #[cfg(test)]
    fn with_docker_bin(mut self, bin: &str) -> Self {
        self.docker_bin = bin.to_string();
        self
    }

    pub async fn run(
        &self,
        files: &[SubmittedFile],
        language: &str,
        command: Option<&str>,
    ) -> Result<ContainerOutcome> {
        let (image, default_cmd) = if language.eq_ignore_ascii_case("python") {
            ("python:3.11", "python main.py")
        } else {
            ("node:18", "node main.js")
        };
        let run_cmd = command.unwrap_or(default_cmd);

        // Staging: unique scratch directory per invocation, so concurrent
        // runs cannot interfere with each other.
        let scratch = std::env::temp_dir().join(format!("vipudev-project-{}", Uuid::new_v4()));
        if let Err(e) = stage_files(&scratch, files) {
            cleanup(&scratch).await;
            return Err(e);
        }

        // Running: one container process, no network, fixed memory/CPU
        // ceilings, scratch directory mounted as the working directory.
        let mount = format!("{}:/app", scratch.display());
        let child = Command::new(&self.docker_bin)
            .args([
                "run",
                "--rm",
                "--network",
                "none",
                "--memory",
                self.memory_limit.as_str(),
                "--cpus",
                self.cpu_limit.as_str(),
                "-v",
                mount.as_str(),
                "-w",
                "/app",
                image,
                "bash",
                "-lc",
                run_cmd,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                cleanup(&scratch).await;
                return Err(anyhow::anyhow!(
                    "Failed to run project in Docker. Ensure Docker is installed and accessible: {}",
                    e
                ));
            }
        };

        debug!("Sandbox container started ({} / {})", image, run_cmd);

        // Collecting: drain both streams until exit or forced termination.
        let mut capture = capture_with_timeout(child, self.limit).await;
        if capture.timed_out {
            capture.stderr.push_str("\n[Process killed due to timeout]");
        }

        // Cleanup runs on every exit path, including after a kill.
        cleanup(&scratch).await;

        Ok(ContainerOutcome {
            stdout: capture.stdout,
            stderr: capture.stderr,
            exit_code: capture.exit_code,
            image_used: image.to_string(),
            command_run: run_cmd.to_string(),
        })
    }
}

/// Normalize a submitted path: strip leading slashes/backslashes, reject
/// absolute or parent-directory components, default empty paths to main.js.
pub fn sanitize_rel_path(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim_start_matches(['/', '\\']);
    let mut clean = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => bail!("Invalid file path: {}", raw),
        }
    }
    if clean.as_os_str().is_empty() {
        clean.push("main.js");
    }
    Ok(clean)
}

pub(crate) fn stage_files(root: &Path, files: &[SubmittedFile]) -> Result<()> {
    for file in files {
        let target = root.join(sanitize_rel_path(&file.path)?);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, &file.content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }
    Ok(())
}

async fn cleanup(scratch: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(scratch).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Scratch cleanup failed for {}: {}", scratch.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_leading_slashes() {
        assert_eq!(
            sanitize_rel_path("/src/main.js").unwrap(),
            PathBuf::from("src/main.js")
        );
        assert_eq!(
            sanitize_rel_path("\\\\win\\style").unwrap(),
            PathBuf::from("win\\style")
        );
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_rel_path("../escape.js").is_err());
        assert!(sanitize_rel_path("src/../../escape.js").is_err());
    }

    #[test]
    fn sanitize_defaults_empty_paths() {
        assert_eq!(sanitize_rel_path("").unwrap(), PathBuf::from("main.js"));
        assert_eq!(sanitize_rel_path("/").unwrap(), PathBuf::from("main.js"));
    }

    #[test]
    fn stage_writes_nested_files() {
        let root = tempfile::tempdir().unwrap();
        let files = vec![
            SubmittedFile {
                path: "main.js".into(),
                content: "console.log(1)".into(),
            },
            SubmittedFile {
                path: "lib/util.js".into(),
                content: "module.exports = {}".into(),
            },
        ];

        stage_files(root.path(), &files).unwrap();

        let nested = root.path().join("lib/util.js");
        assert_eq!(
            std::fs::read_to_string(nested).unwrap(),
            "module.exports = {}"
        );
    }

    #[tokio::test]
    async fn spawn_failure_reports_docker_and_cleans_up() {
        let runner = ContainerRunner::new(
            Duration::from_secs(5),
            "512m".to_string(),
            "1".to_string(),
        )
        .with_docker_bin("vipudev-no-such-runtime");
        let files = vec![SubmittedFile {
            path: "main.js".into(),
            content: "console.log(1)".into(),
        }];

        let scratch_dirs_before = count_scratch_dirs();
        let err = runner.run(&files, "node", None).await.unwrap_err();
        assert!(err.to_string().contains("Docker"));
        // The staged scratch directory is gone despite the failure.
        assert_eq!(count_scratch_dirs(), scratch_dirs_before);
    }

    fn count_scratch_dirs() -> usize {
        std::fs::read_dir(std::env::temp_dir())
            .map(|entries| {
                entries
                    .flatten()
                    .filter(|e| {
                        e.file_name()
                            .to_string_lossy()
                            .starts_with("vipudev-project-")
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    // Requires a working Docker daemon; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn node_project_runs_in_container() {
        let runner = ContainerRunner::new(
            Duration::from_secs(20),
            "512m".to_string(),
            "1".to_string(),
        );
        let files = vec![SubmittedFile {
            path: "main.js".into(),
            content: "console.log(1)".into(),
        }];

        let outcome = runner.run(&files, "node", None).await.unwrap();
        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.stdout.contains('1'));
        assert_eq!(outcome.image_used, "node:18");
    }

    // Requires a working Docker daemon; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn runaway_container_is_killed_with_marker() {
        let runner = ContainerRunner::new(
            Duration::from_secs(2),
            "512m".to_string(),
            "1".to_string(),
        );
        let files = vec![SubmittedFile {
            path: "main.js".into(),
            content: "setInterval(() => {}, 1000)".into(),
        }];

        let scratch_dirs_before = count_scratch_dirs();
        let outcome = runner.run(&files, "node", None).await.unwrap();
        assert!(outcome.stderr.contains("[Process killed due to timeout]"));
        assert_eq!(outcome.exit_code, None);
        assert_eq!(count_scratch_dirs(), scratch_dirs_before);
    }
}
