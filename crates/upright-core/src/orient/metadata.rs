//! EXIF orientation reading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{In, Reader, Tag};

use super::NormalizeError;

/// Source of the raw orientation tag for a file.
pub trait MetadataReader {
    /// Returns the raw `Orientation` value of the primary image, or `None`
    /// if the metadata has no such field.
    fn read_orientation(&self, path: &Path) -> Result<Option<u32>, NormalizeError>;
}

/// Reads the orientation from the EXIF block of a JPEG, TIFF, PNG or WebP container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl MetadataReader for ExifReader {
    fn read_orientation(&self, path: &Path) -> Result<Option<u32>, NormalizeError> {
        let file = File::open(path).map_err(|e| NormalizeError::MetadataUnreadable(e.to_string()))?;
        let mut reader = BufReader::new(file);

        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| NormalizeError::MetadataUnreadable(e.to_string()))?;

        Ok(exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0)))
    }
}
