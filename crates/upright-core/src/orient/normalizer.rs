//! Orientation normalization of uploaded files.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{
    DynamicImageEditor, ExifReader, ImageEditor, ImageHandle, MetadataReader, NormalizeError,
    Outcome, SkipReason, Transform,
};

/// MIME types that carry EXIF orientation worth acting on.
const JPEG_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/pjpeg"];

/// Returns true if `mime` names a JPEG variant.
///
/// Comparison is case-insensitive and ignores parameters after `;`.
pub fn is_jpeg_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    JPEG_MIME_TYPES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(essence))
}

/// Rewrites JPEG uploads so that they are stored upright.
///
/// Every failure short of the final write degrades to [`Outcome::Skipped`]:
/// an upload must never be blocked by a failed auto-rotate.
#[derive(Debug, Clone)]
pub struct OrientationNormalizer<R = ExifReader, E = DynamicImageEditor> {
    reader: R,
    editor: E,
}

impl OrientationNormalizer {
    /// Normalizer backed by EXIF metadata and the `image` crate.
    pub fn new(jpeg_quality: u8) -> Self {
        Self::with_collaborators(ExifReader, DynamicImageEditor::new(jpeg_quality))
    }
}

impl<R: MetadataReader, E: ImageEditor> OrientationNormalizer<R, E> {
    pub fn with_collaborators(reader: R, editor: E) -> Self {
        Self { reader, editor }
    }

    /// Normalize the file at `path` in place.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::PersistFailed`] if the transformed image could
    /// not be written back. No other error is ever returned.
    pub fn normalize(&self, path: &Path, mime: &str) -> Result<Outcome, NormalizeError> {
        if !is_jpeg_mime(mime) {
            debug!(path = %path.display(), mime, "Not a JPEG, skipping orientation");
            return Ok(Outcome::Skipped(SkipReason::NotJpeg));
        }

        let tag = match self.reader.read_orientation(path) {
            Ok(tag) => tag,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No usable EXIF metadata");
                return Ok(Outcome::Skipped(SkipReason::MetadataUnreadable));
            }
        };

        let transform = Transform::for_tag(tag);
        if transform.is_identity() {
            debug!(path = %path.display(), orientation = ?tag, "Already upright");
            return Ok(Outcome::Skipped(SkipReason::AlreadyUpright));
        }

        let mut handle = match self.editor.open(path) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open image for auto-rotate");
                return Ok(Outcome::Skipped(SkipReason::EditorUnavailable));
            }
        };

        for op in transform.ops() {
            if let Err(e) = handle.apply(*op) {
                warn!(path = %path.display(), error = %e, "Auto-rotate aborted");
                return Ok(Outcome::Skipped(SkipReason::TransformFailed));
            }
        }

        handle.save(path)?;

        info!(
            path = %path.display(),
            orientation = ?tag,
            transform = ?transform,
            "Rotated image upright"
        );
        Ok(Outcome::Transformed(transform))
    }
}
