//! Blocking execution of external tools.
//!
//! Every invocation runs to completion on the calling thread. There is no
//! timeout: a hung ffmpeg stalls the pipeline until it exits.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use vertcut_common::error::{VertcutError, VertcutResult};

/// What an invocation is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Probe,
    Fragment,
    Crop { role: String },
    Composite,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Probe => f.write_str("probe"),
            Stage::Fragment => f.write_str("fragment"),
            Stage::Crop { role } => write!(f, "crop:{role}"),
            Stage::Composite => f.write_str("composite"),
        }
    }
}

/// A fully prepared command line.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stage: Stage,

    /// Human-readable summary used in logs and errors.
    pub description: String,

    /// File the invocation is expected to produce, if any.
    pub output: Option<PathBuf>,
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Trait for command execution backends.
pub trait ProcessRunner {
    /// Run the invocation to completion.
    ///
    /// A non-zero exit becomes [`VertcutError::ExternalProcess`] carrying the
    /// captured stderr.
    fn run(&self, invocation: &Invocation) -> VertcutResult<ProcessOutput>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Runs invocations as child processes of this one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> VertcutResult<ProcessOutput> {
        tracing::info!(stage = %invocation.stage, "Running: {}", invocation.description);
        tracing::debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            "Command line"
        );

        let started = std::time::Instant::now();
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                tracing::error!(
                    program = %invocation.program.display(),
                    error = %e,
                    "Failed to start external process"
                );
                VertcutError::ExternalProcess {
                    description: invocation.description.clone(),
                    status: "not started".to_string(),
                    stderr: e.to_string(),
                }
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            tracing::error!(
                stage = %invocation.stage,
                status = %output.status,
                stderr = %stderr,
                "{} failed",
                invocation.description
            );
            return Err(VertcutError::ExternalProcess {
                description: invocation.description.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        tracing::info!(
            stage = %invocation.stage,
            elapsed_ms = started.elapsed().as_millis(),
            "Succeeded: {}",
            invocation.description
        );
        verify_output(invocation)?;
        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr,
        })
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Fail unless the invocation's expected output exists and is non-empty.
///
/// A zero exit alone is not success for commands that produce a file.
pub fn verify_output(invocation: &Invocation) -> VertcutResult<()> {
    let Some(path) = &invocation.output else {
        return Ok(());
    };
    let produced = std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false);
    if produced {
        return Ok(());
    }

    tracing::error!(
        stage = %invocation.stage,
        path = %path.display(),
        "{} exited cleanly but produced no output",
        invocation.description
    );
    Err(VertcutError::ExternalProcess {
        description: invocation.description.clone(),
        status: "exit 0".to_string(),
        stderr: format!("no output produced: {}", path.display()),
    })
}

/// Prefer a binary placed in the working directory over the configured name.
pub fn resolve_tool(configured: &Path) -> PathBuf {
    if configured.components().count() == 1 {
        if let Ok(cwd) = std::env::current_dir() {
            let local = cwd.join(configured);
            if local.is_file() {
                return local;
            }
        }
    }
    configured.to_path_buf()
}

/// Whether `program -version` can be started and exits successfully.
pub fn command_exists(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
