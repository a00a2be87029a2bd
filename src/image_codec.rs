//! Image codec
//!
//! The store treats decoding and resizing as pure functions behind the
//! [`ImageCodec`] trait. It only decides when to call them and where the
//! output is persisted.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageFormat};

use crate::error::{ImgStoreError, Result};
use crate::storage::Dimensions;

/// Decode/resize/encode collaborator used by the store
pub trait ImageCodec: Send + Sync {
    /// Width and height of an encoded image
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Shrink an encoded image to fit `target`, preserving aspect ratio, and
    /// re-encode it
    fn resize_and_encode(&self, bytes: &[u8], target: Dimensions) -> Result<Vec<u8>>;
}

/// Scale factor fitting `original` into `target`:
/// `min(target_w / orig_w, target_h / orig_h)`
pub fn shrink_ratio(original: (u32, u32), target: Dimensions) -> f64 {
    let h_shrink = f64::from(target.width) / f64::from(original.0);
    let v_shrink = f64::from(target.height) / f64::from(original.1);
    h_shrink.min(v_shrink)
}

/// Output dimensions after applying [`shrink_ratio`], never below 1x1
pub fn scaled_dimensions(original: (u32, u32), target: Dimensions) -> (u32, u32) {
    let ratio = shrink_ratio(original, target);
    let scale = |v: u32| ((f64::from(v) * ratio).round() as u32).max(1);
    (scale(original.0), scale(original.1))
}

/// JPEG codec backed by the `image` crate
#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self { quality: 75 }
    }
}

impl ImageCodec for JpegCodec {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)> {
        let reader = image::io::Reader::with_format(Cursor::new(bytes), ImageFormat::Jpeg);
        let dims = reader.into_dimensions()?;
        if dims.0 == 0 || dims.1 == 0 {
            return Err(ImgStoreError::ImageFormat("image has zero dimension".to_string()));
        }
        Ok(dims)
    }

    fn resize_and_encode(&self, bytes: &[u8], target: Dimensions) -> Result<Vec<u8>> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
        if img.width() == 0 || img.height() == 0 {
            return Err(ImgStoreError::ImageFormat("image has zero dimension".to_string()));
        }

        let (width, height) = scaled_dimensions((img.width(), img.height()), target);
        let rgb = img.resize_exact(width, height, FilterType::Lanczos3).to_rgb8();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality).encode(
            rgb.as_raw(),
            width,
            height,
            ColorType::Rgb8,
        )?;
        Ok(out)
    }
}
