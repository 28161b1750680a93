//! Best-effort recompression through external optimizers.
//!
//! - PNG: `optipng -o2 -quiet`, lossless
//! - JPEG: `jpegoptim --max=<quality> --all-progressive`, progressive re-encode
//!
//! The optimizers rewrite the file in place. Any failure leaves the upload as
//! it was and is only logged.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::orient::is_jpeg_mime;

/// Formats the optimizers handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeKind {
    Jpeg,
    Png,
}

impl OptimizeKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        if is_jpeg_mime(mime) {
            return Some(OptimizeKind::Jpeg);
        }
        let essence = mime.split(';').next().unwrap_or_default().trim();
        essence
            .eq_ignore_ascii_case("image/png")
            .then_some(OptimizeKind::Png)
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeOutcome {
    /// The tool ran successfully. Sizes are `None` if the file could not be stat'ed.
    Optimized {
        before: Option<u64>,
        after: Option<u64>,
    },
    /// No optimizer for this MIME type.
    Unsupported,
    /// The binary could not be started.
    ToolUnavailable { tool: PathBuf, reason: String },
    /// The binary exited unsuccessfully. `code` is `None` if killed by a signal.
    ToolFailed { code: Option<i32> },
}

/// Runs the configured optimizer binaries.
#[derive(Debug, Clone)]
pub struct Optimizer {
    jpeg_tool: PathBuf,
    png_tool: PathBuf,
    jpeg_quality: u8,
}

impl Optimizer {
    pub fn new(config: &Config) -> Self {
        Self {
            jpeg_tool: config.tools.jpeg_optimizer.clone(),
            png_tool: config.tools.png_optimizer.clone(),
            jpeg_quality: config.jpeg_quality(),
        }
    }

    /// Build the command line for `path` without running it.
    pub fn command(&self, kind: OptimizeKind, path: &Path) -> Command {
        match kind {
            OptimizeKind::Png => {
                let mut cmd = Command::new(&self.png_tool);
                cmd.arg("-o2").arg("-quiet").arg(path);
                cmd
            }
            OptimizeKind::Jpeg => {
                let mut cmd = Command::new(&self.jpeg_tool);
                cmd.arg(format!("--max={}", self.jpeg_quality))
                    .arg("--all-progressive")
                    .arg("--strip-none")
                    .arg("--quiet")
                    .arg(path);
                cmd
            }
        }
    }

    /// Recompress the file at `path` in place, if its type is supported.
    pub fn optimize(&self, path: &Path, mime: &str) -> OptimizeOutcome {
        let Some(kind) = OptimizeKind::from_mime(mime) else {
            debug!(path = %path.display(), mime, "No optimizer for this type");
            return OptimizeOutcome::Unsupported;
        };

        let mut cmd = self.command(kind, path);
        let tool = PathBuf::from(cmd.get_program());
        let before = file_size(path);

        let output = match cmd.stdin(Stdio::null()).output() {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %tool.display(), error = %e, "Failed to run optimizer");
                return OptimizeOutcome::ToolUnavailable {
                    tool,
                    reason: e.to_string(),
                };
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                path = %path.display(),
                tool = %tool.display(),
                status = %output.status,
                stderr = %stderr.trim(),
                "Optimizer failed, keeping file as is"
            );
            return OptimizeOutcome::ToolFailed {
                code: output.status.code(),
            };
        }

        let after = file_size(path);
        info!(
            path = %path.display(),
            before = ?before,
            after = ?after,
            "Optimized image"
        );
        OptimizeOutcome::Optimized { before, after }
    }
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).map(|m| m.len()).ok()
}
