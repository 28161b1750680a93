//! Per-upload pipeline: auto-orient, then optimize.

use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use tracing::{error, info_span};

use crate::config::Config;
use crate::optimize::{OptimizeOutcome, Optimizer};
use crate::orient::{
    DynamicImageEditor, ExifReader, ImageEditor, MetadataReader, NormalizeError,
    OrientationNormalizer, Outcome,
};

/// One newly uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub path: PathBuf,
    pub mime: String,
}

impl Upload {
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }

    /// Classify the file by extension, falling back to its content.
    /// Unknown files get `application/octet-stream`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = guess_mime(&path).unwrap_or("application/octet-stream");
        Self::new(path, mime)
    }
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let format = ImageFormat::from_path(path).ok().or_else(|| {
        ImageReader::open(path)
            .ok()?
            .with_guessed_format()
            .ok()?
            .format()
    })?;
    Some(format.to_mime_type())
}

/// Result of processing one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// `None` if auto-orientation is disabled.
    pub orientation: Option<Outcome>,
    /// `None` if optimization is disabled.
    pub optimization: Option<OptimizeOutcome>,
}

/// Runs the configured steps over uploads, one file at a time.
#[derive(Debug, Clone)]
pub struct UploadProcessor<R = ExifReader, E = DynamicImageEditor> {
    normalizer: OrientationNormalizer<R, E>,
    optimizer: Optimizer,
    auto_orient: bool,
    optimize: bool,
}

impl UploadProcessor {
    pub fn new(config: &Config) -> Self {
        Self::with_normalizer(config, OrientationNormalizer::new(config.jpeg_quality()))
    }
}

impl<R: MetadataReader, E: ImageEditor> UploadProcessor<R, E> {
    /// Processor using a custom normalizer; the optimizer still comes from `config`.
    pub fn with_normalizer(config: &Config, normalizer: OrientationNormalizer<R, E>) -> Self {
        Self {
            normalizer,
            optimizer: Optimizer::new(config),
            auto_orient: config.auto_orient,
            optimize: config.optimize,
        }
    }

    /// Process a single upload.
    ///
    /// # Errors
    ///
    /// Fails only if the re-oriented image could not be written back; the
    /// optimizer is not run in that case.
    pub fn process(&self, upload: &Upload) -> Result<UploadReport, NormalizeError> {
        let _span = info_span!("upload", path = %upload.path.display(), mime = %upload.mime)
            .entered();

        let orientation = if self.auto_orient {
            Some(self.normalizer.normalize(&upload.path, &upload.mime)?)
        } else {
            None
        };

        let optimization = self
            .optimize
            .then(|| self.optimizer.optimize(&upload.path, &upload.mime));

        Ok(UploadReport {
            orientation,
            optimization,
        })
    }

    /// Process every upload independently. A failure on one file does not
    /// stop the others.
    pub fn process_all(&self, uploads: &[Upload]) -> Vec<Result<UploadReport, NormalizeError>> {
        uploads
            .iter()
            .map(|upload| {
                let result = self.process(upload);
                if let Err(e) = &result {
                    error!(path = %upload.path.display(), error = %e, "Upload processing failed");
                }
                result
            })
            .collect()
    }
}
