//! Containerized CLI analyzer backend.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{Analyzer, AnalyzerError, RawReport};

/// Where the analysis root is mounted inside the container.
pub const MOUNT_POINT: &str = "/workspace";

/// How long removing a timed-out container may take.
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(30);

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a container name unique to this process and run.
fn container_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!(
        "yamldoctor-{}-{}-{:08x}",
        std::process::id(),
        RUN_COUNTER.fetch_add(1, Ordering::Relaxed),
        nanos
    )
}

/// Options for running the YAML Doctor CLI in a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerOptions {
    /// Container runtime executable (`docker`, `podman`, ...).
    pub runtime: String,
    /// Image providing the YAML Doctor CLI.
    pub image: String,
    /// Kill the container after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Report file name the CLI writes under the root.
    pub report_file: String,
    /// Extra CLI flags appended after the output mode flags.
    pub extra_args: Vec<String>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            image: "darioajr/yaml-doctor:latest".to_string(),
            timeout: Some(Duration::from_secs(120)),
            report_file: "yaml-doctor-report.json".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Runs the YAML Doctor CLI inside a container and reads its JSON report.
///
/// The CLI contract: given the root and output flags, it writes the report
/// to `report_file` under the root and exits 0, or exits non-zero and
/// writes nothing.
#[derive(Debug, Clone)]
pub struct ContainerAnalyzer {
    options: ContainerOptions,
}

impl ContainerAnalyzer {
    /// Creates a container analyzer.
    pub fn new(options: ContainerOptions) -> Self {
        Self { options }
    }

    /// Returns the configured options.
    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Arguments passed to the runtime for one run.
    fn command_args(&self, root: &Path, name: &str) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            name.to_string(),
            "-v".to_string(),
            format!("{}:{}", root.display(), MOUNT_POINT),
            "-w".to_string(),
            MOUNT_POINT.to_string(),
            self.options.image.clone(),
            MOUNT_POINT.to_string(),
            "--json".to_string(),
            "--no-html".to_string(),
            "--no-badge".to_string(),
        ];
        args.extend(self.options.extra_args.iter().cloned());
        args
    }

    fn report_path(&self, root: &Path) -> PathBuf {
        root.join(&self.options.report_file)
    }

    /// Force-removes a container left running after its runtime client was
    /// killed, so it cannot write a report into a later run.
    async fn remove_container(&self, name: &str) {
        let mut command = Command::new(&self.options.runtime);
        command
            .args(["rm", "-f", name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(CLEANUP_TIMEOUT, command.status()).await {
            Ok(Ok(status)) if status.success() => debug!("Removed container {}", name),
            Ok(Ok(status)) => warn!("Removing container {} exited with {}", name, status),
            Ok(Err(e)) => warn!("Failed to remove container {}: {}", name, e),
            Err(_) => warn!("Removing container {} timed out", name),
        }
    }
}

impl Analyzer for ContainerAnalyzer {
    fn name(&self) -> &str {
        "container"
    }

    async fn analyze(&self, root: &Path) -> Result<RawReport, AnalyzerError> {
        let root = std::path::absolute(root)?;
        let report_path = self.report_path(&root);

        // A stale report from an earlier run must not be mistaken for this one.
        match tokio::fs::remove_file(&report_path).await {
            Ok(()) => debug!("Removed stale report {}", report_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let name = container_name();
        let args = self.command_args(&root, &name);
        info!(
            "Running {} {} as {} on {}",
            self.options.runtime,
            self.options.image,
            name,
            root.display()
        );

        let child = Command::new(&self.options.runtime)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    AnalyzerError::unavailable(format!(
                        "container runtime '{}' could not be started: {}",
                        self.options.runtime, e
                    ))
                }
                _ => AnalyzerError::Io(e),
            })?;

        let output = match self.options.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    // Killing the client does not stop the container itself.
                    self.remove_container(&name).await;
                    return Err(AnalyzerError::Timeout(limit));
                }
            },
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("Cannot connect to the Docker daemon") {
                return Err(AnalyzerError::unavailable(stderr));
            }
            return Err(AnalyzerError::execution(format!(
                "{} exited with {}: {}",
                self.options.runtime, output.status, stderr
            )));
        }

        let content = match tokio::fs::read_to_string(&report_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalyzerError::execution(format!(
                    "no report written to {}",
                    report_path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let report = RawReport::from_json(&content)?;
        Ok(RawReport::new(rebase_paths(report.into_value())))
    }
}

/// Strips the container mount point from file paths so they resolve
/// relative to the host root.
fn rebase_paths(mut value: Value) -> Value {
    if let Some(files) = value.get_mut("files").and_then(Value::as_array_mut) {
        for file in files.iter_mut().filter_map(Value::as_object_mut) {
            for key in ["path", "file"] {
                if let Some(Value::String(path)) = file.get_mut(key)
                    && let Some(rest) = path.strip_prefix(MOUNT_POINT)
                    && (rest.is_empty() || rest.starts_with('/'))
                {
                    *path = rest.trim_start_matches('/').to_string();
                }
            }
        }
    }
    value
}
