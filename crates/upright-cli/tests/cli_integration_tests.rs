use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::codecs::jpeg::JpegEncoder;
use image::ImageEncoder;

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_upright")
}

/// 4x2 JPEG with an EXIF orientation tag spliced in after SOI.
fn tagged_jpeg(tag: u16) -> Vec<u8> {
    let pixels = vec![128u8; 4 * 2 * 3];
    let mut jpeg = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut jpeg, 90)
        .write_image(&pixels, 4, 2, image::ExtendedColorType::Rgb8)
        .unwrap();
    let jpeg = jpeg.into_inner();

    let mut payload = b"Exif\0\0II\x2A\x00".to_vec();
    payload.extend_from_slice(&8u32.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&0x0112u16.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes());
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&tag.to_le_bytes());
    payload.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let mut out = jpeg[0..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_process_rotates_tagged_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write(dir.path(), "photo.jpg", &tagged_jpeg(6));

    let output = Command::new(binary())
        .current_dir(dir.path())
        .args(["process", "--no-optimize"])
        .arg(&photo)
        .output()
        .expect("upright did not run");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("rotated 90 degrees clockwise"), "stdout: {stdout}");

    let img = image::open(&photo).unwrap();
    assert_eq!((img.width(), img.height()), (2, 4));
}

#[test]
fn test_process_leaves_upright_jpeg_alone() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = tagged_jpeg(1);
    let photo = write(dir.path(), "photo.jpg", &bytes);

    let output = Command::new(binary())
        .current_dir(dir.path())
        .args(["process", "--no-optimize"])
        .arg(&photo)
        .output()
        .expect("upright did not run");

    assert!(output.status.success());
    assert_eq!(fs::read(&photo).unwrap(), bytes);
}

#[test]
fn test_missing_optimizer_does_not_fail() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "upright.toml",
        b"[tools]\njpeg_optimizer = \"/nonexistent/jpegoptim\"\n",
    );
    let photo = write(dir.path(), "photo.jpg", &tagged_jpeg(3));

    let output = Command::new(binary())
        .current_dir(dir.path())
        .arg("process")
        .arg(&photo)
        .output()
        .expect("upright did not run");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("rotated 180 degrees"), "stdout: {stdout}");
    assert!(stdout.contains("not optimized"), "stdout: {stdout}");
}

#[test]
fn test_check_reports_missing_tools() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "custom.toml",
        b"check_dependencies = false\n[tools]\npng_optimizer = \"/nonexistent/optipng\"\n",
    );

    let output = Command::new(binary())
        .args(["check", "--config"])
        .arg(&config)
        .output()
        .expect("upright did not run");

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("PNG optimizer not found: /nonexistent/optipng"));
}

#[test]
fn test_bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "broken.toml", b"jpeg_quality = [");

    let output = Command::new(binary())
        .args(["check", "--config"])
        .arg(&config)
        .output()
        .expect("upright did not run");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to parse config"), "stderr: {stderr}");
}
