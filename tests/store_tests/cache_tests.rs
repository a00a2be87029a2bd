//! Tests for lazily generated derivatives
//!
//! These tests verify:
//! - First read of thumb/small generates and persists the variant
//! - Later reads return identical bytes without calling the codec
//! - Aspect ratio is preserved within the configured bounding box
//! - Generated variants survive reopen

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{dims_of, jpeg, setup_temp_store_path, store_config, CountingCodec, NoResizeCodec};
use imgstore::{Dimensions, ImgStore, ImgStoreError, OpenMode, Resolution, StoreConfig};

fn setup_counting_store(config: &StoreConfig) -> (tempfile::TempDir, std::path::PathBuf, ImgStore, CountingCodec) {
    let (temp, path) = setup_temp_store_path();
    let codec = CountingCodec::default();
    let store = ImgStore::create_with_codec(&path, config, Arc::new(codec.clone())).unwrap();
    (temp, path, store, codec)
}

// =============================================================================
// Generation Tests
// =============================================================================

#[test]
fn test_first_read_generates_variant() {
    let (_temp, _path, mut store, codec) = setup_counting_store(&store_config(3));
    store.insert(&jpeg(400, 300, 1), "pic").unwrap();
    assert!(store.slot(0).unwrap().extent(Resolution::Thumb).is_none());
    let len = store.file_len().unwrap();

    let thumb = store.read("pic", Resolution::Thumb).unwrap();

    assert_eq!(codec.resizes(), 1);
    let extent = store.slot(0).unwrap().extent(Resolution::Thumb).unwrap();
    assert_eq!(extent.offset, len);
    assert_eq!(extent.size as usize, thumb.len());
    assert_eq!(store.file_len().unwrap(), len + thumb.len() as u64);
}

#[test]
fn test_cache_fill_keeps_counters() {
    let (_temp, _path, mut store, _codec) = setup_counting_store(&store_config(3));
    store.insert(&jpeg(400, 300, 1), "pic").unwrap();

    store.read("pic", Resolution::Small).unwrap();
    assert_eq!(store.num_files(), 1);
    assert_eq!(store.header().version, 1);
}

#[test]
fn test_second_read_is_stable() {
    let (_temp, _path, mut store, codec) = setup_counting_store(&store_config(3));
    store.insert(&jpeg(400, 300, 2), "pic").unwrap();

    let first = store.read("pic", Resolution::Small).unwrap();
    let len = store.file_len().unwrap();
    let second = store.read("pic", Resolution::Small).unwrap();

    assert_eq!(first, second);
    assert_eq!(codec.resizes(), 1);
    assert_eq!(store.file_len().unwrap(), len);
}

#[test]
fn test_original_read_never_resizes() {
    let (_temp, _path, mut store, codec) = setup_counting_store(&store_config(3));
    let image = jpeg(400, 300, 3);
    store.insert(&image, "pic").unwrap();

    assert_eq!(store.read("pic", Resolution::Orig).unwrap(), image);
    assert_eq!(codec.resizes(), 0);
}

#[test]
fn test_ensure_variant_on_empty_slot_fails() {
    let (_temp, _path, mut store, _codec) = setup_counting_store(&store_config(3));
    let result = store.ensure_variant(1, Resolution::Thumb);
    assert!(matches!(result, Err(ImgStoreError::InvalidArgument(_))));
}

#[test]
fn test_codec_failure_leaves_slot_untouched() {
    let (_temp, path) = setup_temp_store_path();
    let mut store =
        ImgStore::create_with_codec(&path, &store_config(3), Arc::new(NoResizeCodec)).unwrap();
    let image = jpeg(400, 300, 9);
    store.insert(&image, "pic").unwrap();
    let len = store.file_len().unwrap();

    let result = store.read("pic", Resolution::Thumb);
    assert!(matches!(result, Err(ImgStoreError::ImageFormat(_))));

    assert_eq!(store.file_len().unwrap(), len);
    let slot = store.slot(0).unwrap();
    assert!(slot.valid);
    assert!(slot.extent(Resolution::Thumb).is_none());
    assert_eq!(store.num_files(), 1);
    assert_eq!(store.header().version, 1);

    // The original is still readable
    assert_eq!(store.read("pic", Resolution::Orig).unwrap(), image);
}

// =============================================================================
// Dimension Tests
// =============================================================================

#[test]
fn test_thumb_preserves_aspect_ratio() {
    let (_temp, _path, mut store, _codec) = setup_counting_store(&store_config(3));
    store.insert(&jpeg(200, 100, 4), "wide").unwrap();
    store.insert(&jpeg(100, 200, 5), "tall").unwrap();

    assert_eq!(dims_of(&store.read("wide", Resolution::Thumb).unwrap()), (64, 32));
    assert_eq!(dims_of(&store.read("tall", Resolution::Thumb).unwrap()), (32, 64));
}

#[test]
fn test_small_uses_configured_box() {
    let config = StoreConfig {
        max_files: 3,
        thumb_res: Dimensions::new(32, 32),
        small_res: Dimensions::new(160, 120),
        ..StoreConfig::default()
    };
    let (_temp, _path, mut store, _codec) = setup_counting_store(&config);
    store.insert(&jpeg(640, 480, 6), "pic").unwrap();

    assert_eq!(dims_of(&store.read("pic", Resolution::Small).unwrap()), (160, 120));
    assert_eq!(dims_of(&store.read("pic", Resolution::Thumb).unwrap()), (32, 24));
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_generated_variant_survives_reopen() {
    let (_temp, path, mut store, _codec) = setup_counting_store(&store_config(3));
    store.insert(&jpeg(400, 300, 7), "pic").unwrap();
    let thumb = store.read("pic", Resolution::Thumb).unwrap();
    drop(store);

    let codec = CountingCodec::default();
    let mut store =
        ImgStore::open_with_codec(&path, OpenMode::ReadWrite, Arc::new(codec.clone())).unwrap();
    assert_eq!(store.read("pic", Resolution::Thumb).unwrap(), thumb);
    assert_eq!(codec.resizes(), 0);
}

#[test]
fn test_read_only_store_cannot_generate() {
    let (_temp, path, mut store, _codec) = setup_counting_store(&store_config(3));
    let image = jpeg(400, 300, 8);
    store.insert(&image, "pic").unwrap();
    drop(store);

    let mut store = ImgStore::open(&path, OpenMode::ReadOnly).unwrap();
    assert_eq!(store.read("pic", Resolution::Orig).unwrap(), image);
    let err = store.read("pic", Resolution::Thumb).unwrap_err();
    assert_eq!(err.code(), 1);
}
