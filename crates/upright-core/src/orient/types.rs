//! Core types for orientation normalization.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Error types for orientation normalization.
///
/// Only [`NormalizeError::PersistFailed`] ever leaves
/// [`OrientationNormalizer::normalize`](super::OrientationNormalizer::normalize);
/// the other variants are produced by the collaborators and degrade to a skip.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// EXIF metadata could not be read from the file.
    #[error("EXIF metadata unreadable: {0}")]
    MetadataUnreadable(String),

    /// The file could not be opened for editing.
    #[error("Image editor unavailable: {0}")]
    EditorUnavailable(String),

    /// An editor operation failed on the decoded image.
    #[error("Failed to apply {op}: {reason}")]
    TransformApplyFailed { op: EditOp, reason: String },

    /// Writing the transformed image back failed.
    #[error("Failed to persist {}: {reason}", path.display())]
    PersistFailed { path: PathBuf, reason: String },
}

/// EXIF orientation values (1-8), named after the TIFF convention of
/// where the stored image's first row and column end up when displayed.
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// Already upright.
    TopLeft = 1,
    /// Mirrored left-right.
    TopRight = 2,
    /// Upside down.
    BottomRight = 3,
    /// Mirrored top-bottom.
    BottomLeft = 4,
    /// Mirrored along the main diagonal.
    LeftTop = 5,
    /// Stored rotated 90 degrees counter-clockwise.
    RightTop = 6,
    /// Mirrored along the anti-diagonal.
    RightBottom = 7,
    /// Stored rotated 90 degrees clockwise.
    LeftBottom = 8,
}

impl Orientation {
    /// Parse a raw tag value. Returns `None` for anything outside 1-8.
    pub fn from_tag(value: u32) -> Option<Self> {
        match value {
            1 => Some(Orientation::TopLeft),
            2 => Some(Orientation::TopRight),
            3 => Some(Orientation::BottomRight),
            4 => Some(Orientation::BottomLeft),
            5 => Some(Orientation::LeftTop),
            6 => Some(Orientation::RightTop),
            7 => Some(Orientation::RightBottom),
            8 => Some(Orientation::LeftBottom),
            _ => None,
        }
    }

    /// The raw tag value.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A single call issued to an [`ImageHandle`](super::ImageHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Rotate counter-clockwise by the given number of degrees.
    Rotate(u32),
    /// `horizontal` mirrors top-bottom, `vertical` mirrors left-right.
    Flip { horizontal: bool, vertical: bool },
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Rotate(degrees) => write!(f, "rotate({degrees})"),
            EditOp::Flip {
                horizontal,
                vertical,
            } => write!(f, "flip({horizontal}, {vertical})"),
        }
    }
}

const FLIP_HORIZONTAL: EditOp = EditOp::Flip {
    horizontal: true,
    vertical: false,
};
const FLIP_VERTICAL: EditOp = EditOp::Flip {
    horizontal: false,
    vertical: true,
};

/// The geometric correction needed to display an image upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    #[default]
    Identity,
    /// `flip(true, false)`: mirror top-bottom.
    FlipHorizontal,
    /// `flip(false, true)`: mirror left-right.
    FlipVertical,
    Rotate90,
    Rotate180,
    Rotate270,
    Rotate90ThenFlipHorizontal,
    Rotate270ThenFlipHorizontal,
}

impl Transform {
    /// Select the correction for a raw orientation tag.
    ///
    /// Absent and unrecognized tags map to [`Transform::Identity`].
    pub fn for_tag(tag: Option<u32>) -> Self {
        tag.and_then(Orientation::from_tag)
            .map(Transform::from)
            .unwrap_or_default()
    }

    /// The editor calls making up this transform, in the order they must run.
    ///
    /// Rotation and flip do not commute, so the order is part of the contract.
    pub fn ops(self) -> &'static [EditOp] {
        match self {
            Transform::Identity => &[],
            Transform::FlipHorizontal => &[FLIP_HORIZONTAL],
            Transform::FlipVertical => &[FLIP_VERTICAL],
            Transform::Rotate90 => &[EditOp::Rotate(90)],
            Transform::Rotate180 => &[EditOp::Rotate(180)],
            Transform::Rotate270 => &[EditOp::Rotate(270)],
            Transform::Rotate90ThenFlipHorizontal => &[EditOp::Rotate(90), FLIP_HORIZONTAL],
            Transform::Rotate270ThenFlipHorizontal => &[EditOp::Rotate(270), FLIP_HORIZONTAL],
        }
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self == Transform::Identity
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transform::Identity => "unchanged",
            Transform::FlipHorizontal => "mirrored top-bottom",
            Transform::FlipVertical => "mirrored left-right",
            Transform::Rotate90 => "rotated 90 degrees counter-clockwise",
            Transform::Rotate180 => "rotated 180 degrees",
            Transform::Rotate270 => "rotated 90 degrees clockwise",
            Transform::Rotate90ThenFlipHorizontal => {
                "rotated 90 degrees counter-clockwise and mirrored top-bottom"
            }
            Transform::Rotate270ThenFlipHorizontal => {
                "rotated 90 degrees clockwise and mirrored top-bottom"
            }
        })
    }
}

impl From<Orientation> for Transform {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::TopLeft => Transform::Identity,
            Orientation::TopRight => Transform::FlipVertical,
            Orientation::BottomRight => Transform::Rotate180,
            Orientation::BottomLeft => Transform::FlipHorizontal,
            Orientation::LeftTop => Transform::Rotate90ThenFlipHorizontal,
            Orientation::RightTop => Transform::Rotate270,
            Orientation::RightBottom => Transform::Rotate270ThenFlipHorizontal,
            Orientation::LeftBottom => Transform::Rotate90,
        }
    }
}

/// Why a normalization left the file untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The MIME type is not a JPEG variant.
    NotJpeg,
    /// EXIF could not be read.
    MetadataUnreadable,
    /// No orientation tag, tag 1, or an unrecognized tag.
    AlreadyUpright,
    /// The file could not be opened for editing.
    EditorUnavailable,
    /// An editor operation failed before anything was written.
    TransformFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::NotJpeg => "not a JPEG",
            SkipReason::MetadataUnreadable => "metadata unreadable",
            SkipReason::AlreadyUpright => "already upright",
            SkipReason::EditorUnavailable => "image could not be opened",
            SkipReason::TransformFailed => "transform failed",
        })
    }
}

/// Terminal state of one normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Transformed(Transform),
}

impl Outcome {
    pub fn is_transformed(&self) -> bool {
        matches!(self, Outcome::Transformed(_))
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
