//! Shared helpers for integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb, RgbImage};
use imgstore::{Dimensions, ImageCodec, ImgStore, ImgStoreError, JpegCodec, Result, StoreConfig};
use tempfile::TempDir;

/// A real JPEG of the given size; `seed` changes the pixel content
pub fn jpeg(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 7) as u8).wrapping_add(seed),
            ((y * 3) as u8).wrapping_add(seed),
            seed,
        ])
    });
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, 90)
        .encode(img.as_raw(), width, height, ColorType::Rgb8)
        .unwrap();
    out.into_inner()
}

pub fn store_config(max_files: u32) -> StoreConfig {
    StoreConfig {
        max_files,
        ..StoreConfig::default()
    }
}

/// Temp dir plus the path of a store file inside it (not yet created)
pub fn setup_temp_store_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.imgst");
    (temp_dir, path)
}

pub fn setup_store(max_files: u32) -> (TempDir, PathBuf, ImgStore) {
    let (temp_dir, path) = setup_temp_store_path();
    let store = ImgStore::create(&path, &store_config(max_files)).unwrap();
    (temp_dir, path, store)
}

/// JPEG codec that counts how often it is asked to resize
#[derive(Clone, Default)]
pub struct CountingCodec {
    inner: JpegCodec,
    resizes: Arc<AtomicUsize>,
}

impl CountingCodec {
    pub fn resizes(&self) -> usize {
        self.resizes.load(Ordering::SeqCst)
    }
}

impl ImageCodec for CountingCodec {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        self.inner.decode_dimensions(bytes)
    }

    fn resize_and_encode(&self, bytes: &[u8], target: Dimensions) -> Result<Vec<u8>> {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        self.inner.resize_and_encode(bytes, target)
    }
}

/// Decodes dimensions normally but refuses to resize
pub struct NoResizeCodec;

impl ImageCodec for NoResizeCodec {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        JpegCodec::default().decode_dimensions(bytes)
    }

    fn resize_and_encode(&self, _bytes: &[u8], _target: Dimensions) -> Result<Vec<u8>> {
        Err(ImgStoreError::ImageFormat("resize disabled".to_string()))
    }
}

/// Width and height of an encoded JPEG
pub fn dims_of(bytes: &[u8]) -> (u32, u32) {
    JpegCodec::default().decode_dimensions(bytes).unwrap()
}
