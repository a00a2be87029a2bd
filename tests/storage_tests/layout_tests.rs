//! On-disk layout tests
//!
//! These tests verify:
//! - Size and position of the header and slot table
//! - Field placement inside the header and inside slots
//! - Offset-0 sentinel for absent variants
//! - Header/slot decoding from raw file bytes

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use common::{jpeg, setup_store, setup_temp_store_path};
use imgstore::storage::{slot_position, Header, Slot, HEADER_SIZE, SLOT_SIZE};
use imgstore::{Dimensions, ImgStore, Resolution, StoreConfig};

fn u16_at(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes(bytes[pos..pos + 2].try_into().unwrap())
}

fn u32_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap())
}

fn u64_at(bytes: &[u8], pos: usize) -> u64 {
    u64::from_le_bytes(bytes[pos..pos + 8].try_into().unwrap())
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_created_file_is_header_plus_slot_table() {
    let (_temp, path, store) = setup_store(10);
    drop(store);

    let len = fs::metadata(&path).unwrap().len();
    assert_eq!(len, HEADER_SIZE + 10 * SLOT_SIZE);
    assert_eq!(len, 64 + 10 * 216);
}

#[test]
fn test_header_fields_on_disk() {
    let (_temp, path) = setup_temp_store_path();
    let config = StoreConfig {
        name: "holiday".to_string(),
        max_files: 7,
        thumb_res: Dimensions::new(100, 90),
        small_res: Dimensions::new(300, 200),
    };
    drop(ImgStore::create(&path, &config).unwrap());

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[0..7], b"holiday");
    assert!(bytes[7..32].iter().all(|&b| b == 0));
    assert_eq!(u32_at(&bytes, 32), 0, "version");
    assert_eq!(u32_at(&bytes, 36), 0, "num_files");
    assert_eq!(u32_at(&bytes, 40), 7, "max_files");
    assert_eq!(u16_at(&bytes, 44), 100);
    assert_eq!(u16_at(&bytes, 46), 90);
    assert_eq!(u16_at(&bytes, 48), 300);
    assert_eq!(u16_at(&bytes, 50), 200);
    assert!(bytes[52..64].iter().all(|&b| b == 0));
}

#[test]
fn test_empty_slots_are_zeroed() {
    let (_temp, path, store) = setup_store(3);
    drop(store);

    let bytes = fs::read(&path).unwrap();
    assert!(bytes[HEADER_SIZE as usize..].iter().all(|&b| b == 0));
}

// =============================================================================
// Insert Tests
// =============================================================================

#[test]
fn test_insert_updates_header_and_slot_on_disk() {
    let (_temp, path, mut store) = setup_store(4);
    let image = jpeg(40, 30, 1);
    store.insert(&image, "pic").unwrap();
    drop(store);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(u32_at(&bytes, 32), 1, "version");
    assert_eq!(u32_at(&bytes, 36), 1, "num_files");

    let base = slot_position(0) as usize;
    assert_eq!(&bytes[base..base + 3], b"pic");
    assert_eq!(bytes[base + 3], 0);
    assert_eq!(u32_at(&bytes, base + 160), 40);
    assert_eq!(u32_at(&bytes, base + 164), 30);
    assert_eq!(u32_at(&bytes, base + 176), image.len() as u32, "orig size");
    assert_eq!(u16_at(&bytes, base + 208), 1, "is_valid");

    // Original appended right after the slot table
    let table_end = HEADER_SIZE + 4 * SLOT_SIZE;
    assert_eq!(u64_at(&bytes, base + 200), table_end);
    let start = table_end as usize;
    assert_eq!(&bytes[start..start + image.len()], &image[..]);

    // Derivatives not generated yet
    assert_eq!(u64_at(&bytes, base + 184), 0, "thumb offset");
    assert_eq!(u64_at(&bytes, base + 192), 0, "small offset");
}

#[test]
fn test_slot_decodes_from_file_bytes() {
    let (_temp, path, mut store) = setup_store(4);
    let image = jpeg(40, 30, 2);
    store.insert(&jpeg(20, 20, 9), "first").unwrap();
    store.insert(&image, "second").unwrap();
    let in_memory = store.slot(1).unwrap().clone();
    drop(store);

    let bytes = fs::read(&path).unwrap();
    let start = slot_position(1) as usize;
    let slot = Slot::decode(&bytes[start..start + SLOT_SIZE as usize]).unwrap();
    assert_eq!(slot, in_memory);
    assert_eq!(slot.id, "second");

    let header = Header::decode(&bytes[..HEADER_SIZE as usize]).unwrap();
    assert_eq!(header.num_files, 2);
    assert_eq!(header.version, 2);
}

#[test]
fn test_generated_thumb_offset_written() {
    let (_temp, path, mut store) = setup_store(2);
    store.insert(&jpeg(200, 100, 3), "wide").unwrap();
    let thumb = store.read("wide", Resolution::Thumb).unwrap();
    let len_after = store.file_len().unwrap();
    drop(store);

    let bytes = fs::read(&path).unwrap();
    let base = slot_position(0) as usize;
    let offset = u64_at(&bytes, base + 184);
    let size = u32_at(&bytes, base + 168);
    assert_ne!(offset, 0);
    assert_eq!(size as usize, thumb.len());
    assert_eq!(offset + size as u64, len_after);
    assert_eq!(&bytes[offset as usize..offset as usize + size as usize], &thumb[..]);

    // A cache fill does not bump the version
    assert_eq!(u32_at(&bytes, 32), 1);
}

#[test]
fn test_delete_clears_valid_flag_only() {
    let (_temp, path, mut store) = setup_store(2);
    store.insert(&jpeg(40, 30, 4), "gone").unwrap();
    store.delete("gone").unwrap();
    drop(store);

    let bytes = fs::read(&path).unwrap();
    let base = slot_position(0) as usize;
    assert_eq!(u16_at(&bytes, base + 208), 0);
    assert_eq!(&bytes[base..base + 4], b"gone");
    assert_eq!(u32_at(&bytes, 36), 0, "num_files");
    assert_eq!(u32_at(&bytes, 32), 2, "version");
}
