//! Header and slot records
//!
//! Fixed-width little-endian encodings. Field order and widths are part of the
//! file format and must not change.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::StoreConfig;
use crate::digest::{ContentDigest, DIGEST_LEN};
use crate::error::{ImgStoreError, Result};

use super::resolution::{Resolution, NB_RES};

// =============================================================================
// Format Constants
// =============================================================================

/// Header size: Name (32) + Version (4) + NumFiles (4) + MaxFiles (4)
/// + ResizedDims (8) + reserved (4 + 8) = 64 bytes
pub const HEADER_SIZE: u64 = 64;

/// Slot size: Id (128) + Digest (32) + OrigDims (8) + Sizes (12) + pad (4)
/// + Offsets (24) + Valid (2) + reserved (2) + pad (4) = 216 bytes
pub const SLOT_SIZE: u64 = 216;

/// Longest store name (the field keeps a trailing NUL)
pub const MAX_NAME_LEN: usize = 31;

/// Longest image id (the field keeps a trailing NUL)
pub const MAX_ID_LEN: usize = 127;

/// Absolute cap on `max_files`; anything larger is treated as a corrupt file
pub const MAX_MAX_FILES: u32 = 100_000;

/// Largest allowed thumbnail bounding box
pub const MAX_THUMB_RES: Dimensions = Dimensions::new(128, 128);

/// Largest allowed small-image bounding box
pub const MAX_SMALL_RES: Dimensions = Dimensions::new(512, 512);

pub const DEFAULT_STORE_NAME: &str = "imgstore binary";

const NAME_FIELD_LEN: usize = MAX_NAME_LEN + 1;
const ID_FIELD_LEN: usize = MAX_ID_LEN + 1;
const VALID: u16 = 1;

// =============================================================================
// Dimensions / Extent
// =============================================================================

/// Width x height bounding box of a resized variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Location of one stored variant inside the content region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub offset: u64,
    pub size: u32,
}

// =============================================================================
// Header
// =============================================================================

/// Store header, written at offset 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Display name (not load-bearing)
    pub name: String,
    /// Bumped on every insert/delete, wrapping at `u32::MAX`
    pub version: u32,
    /// Number of valid slots
    pub num_files: u32,
    /// Slot count, fixed at creation
    pub max_files: u32,
    pub thumb_res: Dimensions,
    pub small_res: Dimensions,
}

impl Header {
    /// Fresh header for a new, empty store
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            name: truncate_to_boundary(&config.name, MAX_NAME_LEN).to_string(),
            version: 0,
            num_files: 0,
            max_files: config.max_files,
            thumb_res: config.thumb_res,
            small_res: config.small_res,
        }
    }

    /// Bounding box of a resized variant, `None` for the original
    pub fn derivative_dims(&self, res: Resolution) -> Option<Dimensions> {
        match res {
            Resolution::Thumb => Some(self.thumb_res),
            Resolution::Small => Some(self.small_res),
            Resolution::Orig => None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.num_files >= self.max_files
    }

    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(HEADER_SIZE as usize);
        self.encode_into(&mut out);
        out.freeze()
    }

    pub fn encode_into<B: BufMut>(&self, out: &mut B) {
        put_fixed_str(out, &self.name, NAME_FIELD_LEN);
        out.put_u32_le(self.version);
        out.put_u32_le(self.num_files);
        out.put_u32_le(self.max_files);
        out.put_u16_le(self.thumb_res.width);
        out.put_u16_le(self.thumb_res.height);
        out.put_u16_le(self.small_res.width);
        out.put_u16_le(self.small_res.height);
        out.put_u32_le(0);
        out.put_u64_le(0);
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(ImgStoreError::Corrupt(format!(
                "header too short: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        let mut buf = &bytes[..HEADER_SIZE as usize];

        let name = get_fixed_str(&mut buf, NAME_FIELD_LEN);
        let version = buf.get_u32_le();
        let num_files = buf.get_u32_le();
        let max_files = buf.get_u32_le();
        let thumb_res = Dimensions::new(buf.get_u16_le(), buf.get_u16_le());
        let small_res = Dimensions::new(buf.get_u16_le(), buf.get_u16_le());

        Ok(Self {
            name,
            version,
            num_files,
            max_files,
            thumb_res,
            small_res,
        })
    }
}

// =============================================================================
// Slot
// =============================================================================

/// One metadata record
///
/// `size[r] == 0` or `offset[r] == 0` means variant `r` is not stored; use
/// [`Slot::extent`] rather than testing the raw arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    pub id: String,
    pub digest: ContentDigest,
    /// Width and height of the original image
    pub original_dims: (u32, u32),
    pub size: [u32; NB_RES],
    pub offset: [u64; NB_RES],
    pub valid: bool,
}

impl Slot {
    /// Where variant `res` is stored, if it is
    pub fn extent(&self, res: Resolution) -> Option<Extent> {
        let i = res.index();
        if self.size[i] == 0 || self.offset[i] == 0 {
            None
        } else {
            Some(Extent {
                offset: self.offset[i],
                size: self.size[i],
            })
        }
    }

    pub fn set_extent(&mut self, res: Resolution, extent: Extent) {
        self.offset[res.index()] = extent.offset;
        self.size[res.index()] = extent.size;
    }

    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(SLOT_SIZE as usize);
        self.encode_into(&mut out);
        out.freeze()
    }

    pub fn encode_into<B: BufMut>(&self, out: &mut B) {
        put_fixed_str(out, &self.id, ID_FIELD_LEN);
        out.put_slice(self.digest.as_bytes());
        out.put_u32_le(self.original_dims.0);
        out.put_u32_le(self.original_dims.1);
        for size in self.size {
            out.put_u32_le(size);
        }
        out.put_bytes(0, 4);
        for offset in self.offset {
            out.put_u64_le(offset);
        }
        out.put_u16_le(if self.valid { VALID } else { 0 });
        out.put_u16_le(0);
        out.put_bytes(0, 4);
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SLOT_SIZE as usize {
            return Err(ImgStoreError::Corrupt(format!(
                "slot too short: expected {} bytes, got {}",
                SLOT_SIZE,
                bytes.len()
            )));
        }
        let mut buf = &bytes[..SLOT_SIZE as usize];

        let id = get_fixed_str(&mut buf, ID_FIELD_LEN);
        let mut digest = [0u8; DIGEST_LEN];
        buf.copy_to_slice(&mut digest);
        let original_dims = (buf.get_u32_le(), buf.get_u32_le());

        let mut size = [0u32; NB_RES];
        for s in size.iter_mut() {
            *s = buf.get_u32_le();
        }
        buf.advance(4);

        let mut offset = [0u64; NB_RES];
        for o in offset.iter_mut() {
            *o = buf.get_u64_le();
        }
        let valid = buf.get_u16_le() == VALID;

        Ok(Self {
            id,
            digest: ContentDigest::from_bytes(digest),
            original_dims,
            size,
            offset,
            valid,
        })
    }
}

// =============================================================================
// Fixed-width string helpers
// =============================================================================

/// Write `s` NUL-padded into a `field_len` field, always leaving a trailing NUL
fn put_fixed_str<B: BufMut>(out: &mut B, s: &str, field_len: usize) {
    let text = truncate_to_boundary(s, field_len - 1).as_bytes();
    out.put_slice(text);
    out.put_bytes(0, field_len - text.len());
}

fn get_fixed_str(buf: &mut &[u8], field_len: usize) -> String {
    let whole: &[u8] = *buf;
    let (field, rest) = whole.split_at(field_len);
    *buf = rest;
    let end = field.iter().position(|&b| b == 0).unwrap_or(field_len);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
