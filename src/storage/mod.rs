//! Storage Module
//!
//! The on-disk layout of an imgstore file and the raw record I/O on top of it.
//!
//! ## Responsibilities
//! - Encode/decode the fixed-size header and metadata slots
//! - Read the full slot table on open, write it once on create
//! - Rewrite single records in place (header or one slot)
//! - Append content blobs and read them back by extent
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (64 bytes)                      │
//! │ ┌──────────┬─────────┬──────┬───────┐  │
//! │ │ Name(32) │Version  │Count │ Max   │  │
//! │ ├──────────┴─────────┴──────┴───────┤  │
//! │ │ Resized dims (4 x u16) | reserved │  │
//! │ └───────────────────────────────────┘  │
//! ├────────────────────────────────────────┤
//! │ Slot[0] .. Slot[max_files-1]           │
//! │   (216 bytes each)                     │
//! ├────────────────────────────────────────┤
//! │ Content region (append-only)           │
//! │   raw originals + resized variants,    │
//! │   addressed by Slot.offset[res]        │
//! └────────────────────────────────────────┘
//! ```
//!
//! Offset 0 always lies inside the header, so an offset of 0 in a slot means
//! "variant not present".

mod file;
mod layout;
mod resolution;

pub use file::{slot_position, OpenMode, StoreFile};
pub use layout::{
    Dimensions, Extent, Header, Slot, DEFAULT_STORE_NAME, HEADER_SIZE, MAX_ID_LEN,
    MAX_MAX_FILES, MAX_NAME_LEN, MAX_SMALL_RES, MAX_THUMB_RES, SLOT_SIZE,
};
pub use resolution::{Resolution, NB_RES};
