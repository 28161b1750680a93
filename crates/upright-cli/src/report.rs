//! One-line summaries printed per processed file.

use std::io::{self, Write};

use upright_core::orient::SkipReason;
use upright_core::{NormalizeError, OptimizeOutcome, Outcome, Upload, UploadReport};

/// Print one line per upload and return how many uploads failed.
pub fn write_results<W: Write>(
    out: &mut W,
    uploads: &[Upload],
    results: &[Result<UploadReport, NormalizeError>],
) -> io::Result<usize> {
    let mut failed = 0;
    for (upload, result) in uploads.iter().zip(results) {
        match result {
            Ok(report) => writeln!(out, "{}: {}", upload.path.display(), summarize(report))?,
            Err(e) => {
                failed += 1;
                writeln!(out, "{}: failed: {e}", upload.path.display())?;
            }
        }
    }
    Ok(failed)
}

pub fn summarize(report: &UploadReport) -> String {
    let mut parts = Vec::new();

    match report.orientation {
        Some(Outcome::Transformed(transform)) => parts.push(transform.to_string()),
        Some(Outcome::Skipped(SkipReason::AlreadyUpright)) => parts.push("upright".to_string()),
        Some(Outcome::Skipped(SkipReason::NotJpeg)) | None => {}
        Some(Outcome::Skipped(reason)) => parts.push(format!("not rotated ({reason})")),
    }

    match &report.optimization {
        Some(OptimizeOutcome::Optimized {
            before: Some(before),
            after: Some(after),
        }) => parts.push(format!("optimized {before} -> {after} bytes")),
        Some(OptimizeOutcome::Optimized { .. }) => parts.push("optimized".to_string()),
        Some(OptimizeOutcome::ToolUnavailable { tool, .. }) => {
            parts.push(format!("not optimized ({} unavailable)", tool.display()))
        }
        Some(OptimizeOutcome::ToolFailed { code: Some(code) }) => {
            parts.push(format!("not optimized (exit {code})"))
        }
        Some(OptimizeOutcome::ToolFailed { code: None }) => {
            parts.push("not optimized (killed)".to_string())
        }
        Some(OptimizeOutcome::Unsupported) | None => {}
    }

    if parts.is_empty() {
        "unchanged".to_string()
    } else {
        parts.join(", ")
    }
}
