//! Image resolutions (variants)
//!
//! The discriminants are the on-disk indices into `Slot.size` / `Slot.offset`.

use std::fmt;
use std::str::FromStr;

use crate::error::ImgStoreError;

/// Number of stored variants per image
pub const NB_RES: usize = 3;

/// A stored variant of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Resolution {
    Thumb = 0,
    Small = 1,
    Orig = 2,
}

impl Resolution {
    /// All variants in on-disk index order
    pub const ALL: [Resolution; NB_RES] = [Resolution::Thumb, Resolution::Small, Resolution::Orig];

    /// The resized variants (everything but the original)
    pub const DERIVATIVES: [Resolution; NB_RES - 1] = [Resolution::Thumb, Resolution::Small];

    /// Index into the per-slot size/offset arrays
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_original(self) -> bool {
        self == Resolution::Orig
    }

    /// Short name, used for file suffixes and listings
    pub fn name(self) -> &'static str {
        match self {
            Resolution::Thumb => "thumb",
            Resolution::Small => "small",
            Resolution::Orig => "orig",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resolution {
    type Err = ImgStoreError;

    /// Accepts "orig"/"original", "thumb"/"thumbnail" and "small"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" | "thumbnail" => Ok(Resolution::Thumb),
            "small" => Ok(Resolution::Small),
            "orig" | "original" => Ok(Resolution::Orig),
            other => Err(ImgStoreError::InvalidResolution(other.to_string())),
        }
    }
}
