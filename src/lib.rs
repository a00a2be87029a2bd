//! # imgstore
//!
//! A single-file image store with:
//! - A fixed-size metadata table followed by an append-only content region
//! - Content-hash deduplication of originals
//! - Lazily generated, persisted thumbnail and small variants
//! - Soft delete with offline compaction
//! - A TCP front end and a local management CLI
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │   TCP Server (network)   │   │   imgstore-mgr (CLI)     │
//! └────────────┬─────────────┘   └────────────┬─────────────┘
//!              │  Arc<Mutex<ImgStore>>        │
//! ┌────────────▼──────────────────────────────▼─────────────┐
//! │                   Store Handle (store)                   │
//! │        header + full slot table, single caller           │
//! └──────┬──────────────────┬──────────────────┬────────────┘
//!        │ insert           │ read (missing)   │ gc
//!        ▼                  ▼                  ▼
//!  ┌───────────┐     ┌─────────────┐    ┌─────────────┐
//!  │   Dedup   │     │    Cache    │    │  Compactor  │
//!  │ (digest)  │     │(image_codec)│    │             │
//!  └─────┬─────┘     └──────┬──────┘    └──────┬──────┘
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                   ┌───────────────┐
//!                   │    Storage    │
//!                   │ (header/slots │
//!                   │  + blobs)     │
//!                   └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod digest;
pub mod image_codec;
pub mod dedup;
pub mod store;
pub mod cache;
pub mod list;
pub mod compact;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ImgStoreError, Result};
pub use config::{Config, StoreConfig};
pub use compact::{compact, compact_with_codec, CompactStats};
pub use image_codec::{ImageCodec, JpegCodec};
pub use storage::{Dimensions, OpenMode, Resolution};
pub use store::{ImgStore, SlotIndex};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of imgstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
