//! Editable image handles backed by the `image` crate.
//!
//! Handles follow a flip/rotate vocabulary where `rotate(degrees)` turns the
//! picture counter-clockwise and `flip(horizontal, vertical)` selects the
//! mirror axis: `horizontal` swaps top and bottom rows, `vertical` swaps left
//! and right columns.

use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageFormat, ImageReader};
use tempfile::NamedTempFile;

use super::{EditOp, NormalizeError};

/// Opens files for editing.
pub trait ImageEditor {
    type Handle: ImageHandle;

    fn open(&self, path: &Path) -> Result<Self::Handle, NormalizeError>;
}

/// Exclusive, single-use access to decoded pixel data.
pub trait ImageHandle {
    /// Rotate counter-clockwise by `degrees`.
    fn rotate(&mut self, degrees: u32) -> Result<(), NormalizeError>;

    fn flip(&mut self, horizontal: bool, vertical: bool) -> Result<(), NormalizeError>;

    /// Encode and write the image to `path`, consuming the handle.
    fn save(self, path: &Path) -> Result<(), NormalizeError>;

    /// Dispatch a single [`EditOp`].
    fn apply(&mut self, op: EditOp) -> Result<(), NormalizeError> {
        match op {
            EditOp::Rotate(degrees) => self.rotate(degrees),
            EditOp::Flip {
                horizontal,
                vertical,
            } => self.flip(horizontal, vertical),
        }
    }
}

/// Editor that decodes with the `image` crate and re-encodes in the source format.
#[derive(Debug, Clone, Copy)]
pub struct DynamicImageEditor {
    jpeg_quality: u8,
}

impl DynamicImageEditor {
    /// `jpeg_quality` is clamped to 1-100.
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }
}

impl ImageEditor for DynamicImageEditor {
    type Handle = EditableImage;

    fn open(&self, path: &Path) -> Result<EditableImage, NormalizeError> {
        let reader = ImageReader::open(path)
            .map_err(|e| NormalizeError::EditorUnavailable(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| NormalizeError::EditorUnavailable(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| NormalizeError::EditorUnavailable("unrecognized image format".into()))?;

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| NormalizeError::EditorUnavailable(e.to_string()))?;
        // An unreadable profile is dropped
        let icc = decoder.icc_profile().ok().flatten();
        let image = DynamicImage::from_decoder(decoder)
            .map_err(|e| NormalizeError::EditorUnavailable(e.to_string()))?;

        Ok(EditableImage::new(image, format, self.jpeg_quality).with_icc_profile(icc))
    }
}

/// A decoded image together with the format it is written back in.
#[derive(Debug, Clone)]
pub struct EditableImage {
    image: DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
    icc: Option<Vec<u8>>,
}

impl EditableImage {
    pub fn new(image: DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Self {
        Self {
            image,
            format,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            icc: None,
        }
    }

    /// Embedded color profile to write back on save.
    pub fn with_icc_profile(mut self, icc: Option<Vec<u8>>) -> Self {
        self.icc = icc;
        self
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc.as_deref()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    fn encode_into<W: Write + std::io::Seek>(&self, writer: &mut W) -> Result<(), String> {
        match self.format {
            ImageFormat::Jpeg => {
                // The JPEG encoder only accepts 8-bit gray or RGB
                let pixels = match self.image {
                    DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                        Cow::Borrowed(&self.image)
                    }
                    _ => Cow::Owned(DynamicImage::ImageRgb8(self.image.to_rgb8())),
                };
                let mut encoder = JpegEncoder::new_with_quality(writer, self.jpeg_quality);
                if let Some(icc) = self.icc.clone() {
                    let _ = encoder.set_icc_profile(icc); // ignore UnsupportedError
                }
                pixels.write_with_encoder(encoder).map_err(|e| e.to_string())
            }
            ImageFormat::Png => {
                let mut encoder = PngEncoder::new(writer);
                if let Some(icc) = self.icc.clone() {
                    let _ = encoder.set_icc_profile(icc); // ignore UnsupportedError
                }
                self.image
                    .write_with_encoder(encoder)
                    .map_err(|e| e.to_string())
            }
            format => self
                .image
                .write_to(writer, format)
                .map_err(|e| e.to_string()),
        }
    }
}

impl ImageHandle for EditableImage {
    fn rotate(&mut self, degrees: u32) -> Result<(), NormalizeError> {
        self.image = match degrees % 360 {
            0 => return Ok(()),
            90 => self.image.rotate270(),
            180 => self.image.rotate180(),
            270 => self.image.rotate90(),
            _ => {
                return Err(NormalizeError::TransformApplyFailed {
                    op: EditOp::Rotate(degrees),
                    reason: "only right-angle rotations are supported".into(),
                })
            }
        };
        Ok(())
    }

    fn flip(&mut self, horizontal: bool, vertical: bool) -> Result<(), NormalizeError> {
        if horizontal {
            self.image = self.image.flipv();
        }
        if vertical {
            self.image = self.image.fliph();
        }
        Ok(())
    }

    fn save(self, path: &Path) -> Result<(), NormalizeError> {
        let persist_err = |reason: String| NormalizeError::PersistFailed {
            path: path.to_path_buf(),
            reason,
        };

        // Write through symlinks; renaming over the link itself would replace it
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let path = target.as_path();

        // Stage next to the target so the final rename stays on one filesystem
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| persist_err(e.to_string()))?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            self.encode_into(&mut writer).map_err(persist_err)?;
            writer.flush().map_err(|e| persist_err(e.to_string()))?;
        }

        // Temp files are created owner-only; keep the upload's original mode
        if let Ok(metadata) = fs::metadata(path) {
            staged
                .as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| persist_err(e.to_string()))?;
        }

        staged
            .persist(path)
            .map_err(|e| persist_err(e.error.to_string()))?;
        Ok(())
    }
}
