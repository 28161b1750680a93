//! Fixtures shared by the unit tests.

use std::io::Cursor;
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, ImageEncoder, Luma};
use tempfile::TempDir;

/// Encode a mid-gray RGB JPEG without any metadata.
pub fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = vec![128u8; (width * height * 3) as usize];
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, 90)
        .write_image(&pixels, width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buffer.into_inner()
}

/// Encode a mid-gray RGB JPEG with an embedded ICC profile.
pub fn jpeg_with_icc(width: u32, height: u32, icc: &[u8]) -> Vec<u8> {
    let pixels = vec![128u8; (width * height * 3) as usize];
    let mut buffer = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, 90);
    encoder.set_icc_profile(icc.to_vec()).unwrap();
    encoder
        .write_image(&pixels, width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buffer.into_inner()
}

/// Encode a JPEG carrying an APP1 EXIF segment with the given orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, tag: u16) -> Vec<u8> {
    insert_orientation(&plain_jpeg(width, height), tag)
}

/// Splice a minimal little-endian EXIF block right after the SOI marker.
pub fn insert_orientation(jpeg: &[u8], tag: u16) -> Vec<u8> {
    assert_eq!(&jpeg[0..2], &[0xFF, 0xD8], "not a JPEG");

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2A\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_le_bytes()); // entry count
    tiff.extend_from_slice(&0x0112u16.to_le_bytes()); // Orientation
    tiff.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&tag.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes()); // no IFD1

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[0..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write `bytes` into a fresh temporary directory.
/// Keep the returned `TempDir` alive for as long as the file is needed.
pub fn write_temp(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}

/// A grayscale image where every pixel has a distinct value, row-major from 0.
pub fn numbered_image(width: u32, height: u32) -> DynamicImage {
    let mut img = GrayImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Luma([(y * width + x) as u8]);
    }
    DynamicImage::ImageLuma8(img)
}

/// Produce what a camera would store for an upright image under the given tag.
pub fn stored_for_tag(upright: &DynamicImage, tag: u32) -> DynamicImage {
    match tag {
        1 => upright.clone(),
        2 => upright.fliph(),
        3 => upright.rotate180(),
        4 => upright.flipv(),
        5 => upright.rotate90().fliph(),
        6 => upright.rotate270(),
        7 => upright.rotate270().fliph(),
        8 => upright.rotate90(),
        _ => panic!("no stored form for tag {tag}"),
    }
}
