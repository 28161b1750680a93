//! Pipeline configuration.
//!
//! All settings live in one struct handed to the components at construction.
//! Files are TOML; every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// JPEG quality used when the configured value is out of range.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// File name looked up in the working directory when no config is given.
pub const DEFAULT_CONFIG_FILE: &str = "upright.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rotate JPEG uploads according to their EXIF orientation.
    pub auto_orient: bool,
    /// Run the external optimizers after orientation.
    pub optimize: bool,
    /// Probe for the optimizer binaries before processing.
    pub check_dependencies: bool,
    /// Quality (1-100) for re-encoded JPEGs.
    #[serde(deserialize_with = "deserialize_quality")]
    jpeg_quality: u8,
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_orient: true,
            optimize: true,
            check_dependencies: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            tools: ToolsConfig::default(),
        }
    }
}

/// Locations of the external optimizer binaries.
///
/// A value containing a path separator is used as-is, a bare name is looked
/// up on `PATH`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub jpeg_optimizer: PathBuf,
    pub png_optimizer: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            jpeg_optimizer: PathBuf::from("jpegoptim"),
            png_optimizer: PathBuf::from("optipng"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalize();
        Ok(config)
    }

    /// Load `path` if given, otherwise `upright.toml` in `dir` if it exists,
    /// otherwise the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Override the JPEG quality, applying the same range check as the file.
    pub fn set_jpeg_quality(&mut self, quality: i64) {
        self.jpeg_quality = sanitize_quality(quality);
    }

    /// The effective JPEG quality, always in 1-100.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn normalize(&mut self) {
        if self.tools.jpeg_optimizer.as_os_str().is_empty() {
            self.tools.jpeg_optimizer = ToolsConfig::default().jpeg_optimizer;
        }
        if self.tools.png_optimizer.as_os_str().is_empty() {
            self.tools.png_optimizer = ToolsConfig::default().png_optimizer;
        }
    }
}

fn deserialize_quality<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    i64::deserialize(deserializer).map(sanitize_quality)
}

/// Misconfigured qualities fall back to the default rather than being clamped.
fn sanitize_quality(quality: i64) -> u8 {
    match quality {
        1..=100 => quality as u8,
        _ => DEFAULT_JPEG_QUALITY,
    }
}
