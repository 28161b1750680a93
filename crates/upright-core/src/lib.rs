//! Upright Core - upload image post-processing
//!
//! This crate rewrites freshly uploaded images before they are stored:
//! JPEGs are rotated upright according to their EXIF orientation, then
//! JPEGs and PNGs are recompressed by external optimizer binaries.

pub mod config;
pub mod deps;
pub mod optimize;
pub mod orient;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use config::{Config, ConfigError};
pub use deps::{check_dependencies, MissingTool};
pub use optimize::{OptimizeOutcome, Optimizer};
pub use orient::{NormalizeError, OrientationNormalizer, Outcome, Transform};
pub use upload::{Upload, UploadProcessor, UploadReport};
