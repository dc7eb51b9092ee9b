#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Bytes of a blank 24-bit BMP with the given dimensions.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Creates an image root holding small BMPs and a `labels.json`.
pub fn image_root(images: &[&str], labels: &[&str]) -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("create temp dir");
    for image in images {
        write_bmp(&temp.path().join(image), 4, 3);
    }
    let schema = serde_json::json!({ "labels": labels });
    fs::write(temp.path().join("labels.json"), schema.to_string()).expect("write labels.json");
    temp
}

pub fn write_annotation(root: &Path, json: &str) {
    fs::write(root.join("annotation.json"), json).expect("write annotation.json");
}

pub fn read_annotation(root: &Path) -> serde_json::Value {
    let text = fs::read_to_string(root.join("annotation.json")).expect("read annotation.json");
    serde_json::from_str(&text).expect("parse annotation.json")
}
