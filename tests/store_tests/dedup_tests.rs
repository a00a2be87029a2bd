//! Tests for content deduplication
//!
//! These tests verify:
//! - Identical bytes under a new id share the stored original
//! - Derivatives present at insert time are shared as well
//! - Distinct content is appended separately
//! - Aliased entries survive deletion of their source

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{jpeg, setup_store, setup_temp_store_path, store_config, CountingCodec};
use imgstore::{ImgStore, OpenMode, Resolution};

// =============================================================================
// Original Sharing Tests
// =============================================================================

#[test]
fn test_duplicate_content_shares_original() {
    let (_temp, _path, mut store) = setup_store(5);
    let image = jpeg(80, 60, 1);

    store.insert(&image, "first").unwrap();
    let len_after_first = store.file_len().unwrap();
    store.insert(&image, "second").unwrap();

    assert_eq!(store.file_len().unwrap(), len_after_first);
    assert_eq!(store.num_files(), 2);
    assert_eq!(store.header().version, 2);

    let first = store.slot(0).unwrap();
    let second = store.slot(1).unwrap();
    assert_eq!(first.digest, second.digest);
    assert_eq!(
        first.extent(Resolution::Orig),
        second.extent(Resolution::Orig)
    );
    assert_eq!(second.original_dims, (80, 60));

    assert_eq!(store.read("second", Resolution::Orig).unwrap(), image);
}

#[test]
fn test_distinct_content_appended_separately() {
    let (_temp, _path, mut store) = setup_store(5);
    let a = jpeg(80, 60, 1);
    let b = jpeg(80, 60, 2);
    assert_ne!(a, b);

    store.insert(&a, "a").unwrap();
    let len = store.file_len().unwrap();
    store.insert(&b, "b").unwrap();

    assert_eq!(store.file_len().unwrap(), len + b.len() as u64);
    assert_ne!(
        store.slot(0).unwrap().extent(Resolution::Orig),
        store.slot(1).unwrap().extent(Resolution::Orig)
    );
}

#[test]
fn test_dedup_is_idempotent_across_many_aliases() {
    let (_temp, _path, mut store) = setup_store(10);
    let image = jpeg(64, 64, 7);

    store.insert(&image, "x0").unwrap();
    let len = store.file_len().unwrap();
    for i in 1..6 {
        store.insert(&image, &format!("x{}", i)).unwrap();
    }

    assert_eq!(store.file_len().unwrap(), len);
    let extent = store.slot(0).unwrap().extent(Resolution::Orig);
    for i in 1..6 {
        assert_eq!(store.slot(i).unwrap().extent(Resolution::Orig), extent);
    }
}

// =============================================================================
// Derivative Sharing Tests
// =============================================================================

#[test]
fn test_existing_derivative_shared_without_resize() {
    let (_temp, path) = setup_temp_store_path();
    let codec = CountingCodec::default();
    let mut store =
        ImgStore::create_with_codec(&path, &store_config(5), Arc::new(codec.clone())).unwrap();
    let image = jpeg(300, 200, 3);

    store.insert(&image, "src").unwrap();
    let thumb = store.read("src", Resolution::Thumb).unwrap();
    assert_eq!(codec.resizes(), 1);

    store.insert(&image, "copy").unwrap();
    assert_eq!(
        store.slot(1).unwrap().extent(Resolution::Thumb),
        store.slot(0).unwrap().extent(Resolution::Thumb)
    );

    let copy_thumb = store.read("copy", Resolution::Thumb).unwrap();
    assert_eq!(copy_thumb, thumb);
    assert_eq!(codec.resizes(), 1);
}

#[test]
fn test_missing_derivative_generated_per_alias() {
    let (_temp, path) = setup_temp_store_path();
    let codec = CountingCodec::default();
    let mut store =
        ImgStore::create_with_codec(&path, &store_config(5), Arc::new(codec.clone())).unwrap();
    let image = jpeg(300, 200, 3);

    store.insert(&image, "src").unwrap();
    store.insert(&image, "copy").unwrap();

    // Derivatives generated after the alias was made are not shared back
    store.read("copy", Resolution::Small).unwrap();
    assert!(store.slot(0).unwrap().extent(Resolution::Small).is_none());
    store.read("src", Resolution::Small).unwrap();
    assert_eq!(codec.resizes(), 2);
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[test]
fn test_alias_survives_source_delete() {
    let (_temp, path, mut store) = setup_store(5);
    let image = jpeg(80, 60, 4);

    store.insert(&image, "src").unwrap();
    store.insert(&image, "copy").unwrap();
    store.delete("src").unwrap();
    drop(store);

    let mut store = ImgStore::open(&path, OpenMode::ReadWrite).unwrap();
    assert_eq!(store.read("copy", Resolution::Orig).unwrap(), image);
}

#[test]
fn test_deleted_content_not_used_as_alias_source() {
    let (_temp, _path, mut store) = setup_store(5);
    let image = jpeg(80, 60, 5);

    store.insert(&image, "gone").unwrap();
    store.delete("gone").unwrap();
    let len = store.file_len().unwrap();

    // Only valid slots are dedup candidates, so the bytes are appended again
    store.insert(&image, "fresh").unwrap();
    assert_eq!(store.file_len().unwrap(), len + image.len() as u64);
    assert_eq!(store.read("fresh", Resolution::Orig).unwrap(), image);
}
