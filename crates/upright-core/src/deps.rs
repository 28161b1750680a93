//! Availability checks for the external optimizer binaries.

use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;

/// Which optimizer a missing binary was configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRole {
    Jpeg,
    Png,
}

impl fmt::Display for ToolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolRole::Jpeg => f.write_str("JPEG optimizer"),
            ToolRole::Png => f.write_str("PNG optimizer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub role: ToolRole,
    pub configured: PathBuf,
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found: {}", self.role, self.configured.display())
    }
}

/// List the configured optimizers that cannot be found.
///
/// Always empty when `check_dependencies` is disabled.
pub fn check_dependencies(config: &Config) -> Vec<MissingTool> {
    if !config.check_dependencies {
        return Vec::new();
    }
    let search_path = env::var_os("PATH").unwrap_or_default();

    [
        (ToolRole::Jpeg, &config.tools.jpeg_optimizer),
        (ToolRole::Png, &config.tools.png_optimizer),
    ]
    .into_iter()
    .filter(|(_, tool)| resolve_tool(tool, &search_path).is_none())
    .map(|(role, tool)| MissingTool {
        role,
        configured: tool.clone(),
    })
    .collect()
}

/// Resolve a configured tool to an existing file.
///
/// Values with a directory component are checked directly; bare names are
/// searched for in each entry of `search_path`.
pub fn resolve_tool(tool: &Path, search_path: &OsStr) -> Option<PathBuf> {
    if tool.as_os_str().is_empty() {
        return None;
    }
    if tool.components().count() > 1 {
        return is_executable(tool).then(|| tool.to_path_buf());
    }

    let found = env::split_paths(search_path)
        .flat_map(|dir| candidates(&dir, tool))
        .find(|candidate| is_executable(candidate));
    debug!(tool = %tool.display(), found = ?found, "Resolved optimizer");
    found
}

fn candidates(dir: &Path, tool: &Path) -> Vec<PathBuf> {
    let plain = dir.join(tool);
    if cfg!(windows) && tool.extension().is_none() {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
