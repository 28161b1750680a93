//! EXIF auto-orientation for uploaded JPEG files.
//!
//! This module provides functionality for:
//! - Reading the EXIF `Orientation` tag of an upload
//! - Mapping the tag to a fixed sequence of rotate/flip calls
//! - Applying the sequence and atomically rewriting the file in place
//!
//! # Failure policy
//!
//! Unreadable metadata, undecodable images and failed edits all leave the
//! file untouched and report success. Only a failed write is an error,
//! because it is the one step that can damage the upload.
//!
//! # Examples
//!
//! ```ignore
//! use upright_core::orient::OrientationNormalizer;
//!
//! let normalizer = OrientationNormalizer::new(85);
//! let outcome = normalizer.normalize("upload.jpg".as_ref(), "image/jpeg")?;
//! println!("{outcome:?}");
//! ```

mod editor;
mod metadata;
mod normalizer;
mod types;

pub use editor::{DynamicImageEditor, EditableImage, ImageEditor, ImageHandle};
pub use metadata::{ExifReader, MetadataReader};
pub use normalizer::{is_jpeg_mime, OrientationNormalizer};
pub use types::{EditOp, NormalizeError, Orientation, Outcome, SkipReason, Transform};
