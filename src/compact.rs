//! Compactor
//!
//! Offline garbage collection: rebuild the store into a scratch file holding
//! only live entries, then rename the scratch file over the original.
//!
//! The rename is the only step that touches the original path. Any earlier
//! failure leaves the original as it was and removes the scratch file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ImgStoreError, Result};
use crate::image_codec::{ImageCodec, JpegCodec};
use crate::storage::{OpenMode, Resolution};
use crate::store::{open_file, ImgStore};

/// Summary of a compaction run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactStats {
    /// Live entries copied into the new store
    pub entries: u32,
    /// Store file size before compaction
    pub bytes_before: u64,
    /// Store file size after compaction
    pub bytes_after: u64,
}

impl CompactStats {
    pub fn bytes_reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Compact the store at `source`, using `scratch` as the temporary file
pub fn compact(source: impl AsRef<Path>, scratch: impl AsRef<Path>) -> Result<CompactStats> {
    compact_with_codec(source, scratch, Arc::new(JpegCodec::default()))
}

pub fn compact_with_codec(
    source: impl AsRef<Path>,
    scratch: impl AsRef<Path>,
    codec: Arc<dyn ImageCodec>,
) -> Result<CompactStats> {
    let (source, scratch) = (source.as_ref(), scratch.as_ref());
    if source == scratch {
        return Err(ImgStoreError::InvalidArgument(
            "scratch path must differ from the store path".to_string(),
        ));
    }

    let mut src = ImgStore::open_with_codec(source, OpenMode::ReadOnly, Arc::clone(&codec))?;
    let bytes_before = src.file_len()?;

    let migrated = migrate(&mut src, scratch, codec).and_then(|dst| {
        let bytes_after = dst.file_len()?;
        Ok((dst, bytes_after))
    });
    let (mut dst, bytes_after) = match migrated {
        Ok(done) => done,
        Err(e) => {
            tracing::warn!("Compaction of {} aborted: {}", source.display(), e);
            let _ = fs::remove_file(scratch);
            return Err(e);
        }
    };

    let stats = CompactStats {
        entries: dst.num_files(),
        bytes_before,
        bytes_after,
    };
    src.close();
    dst.close();

    if let Err(e) = fs::rename(scratch, source) {
        let _ = fs::remove_file(scratch);
        return Err(e.into());
    }

    tracing::info!(
        "Compacted {}: {} entries, {} -> {} bytes",
        source.display(),
        stats.entries,
        stats.bytes_before,
        stats.bytes_after
    );
    Ok(stats)
}

/// Copy every live entry of `src` into a fresh store at `scratch`
///
/// Originals go through the ordinary insert path (so dedup and digests are
/// recomputed). Only derivatives that already existed in `src` are generated.
fn migrate(src: &mut ImgStore, scratch: &Path, codec: Arc<dyn ImageCodec>) -> Result<ImgStore> {
    let mut dst = ImgStore::create_with_codec(scratch, &src.store_config(), codec)?;

    for index in 0..src.slots.len() {
        if !src.slots[index].valid {
            continue;
        }
        let slot = src.slots[index].clone();
        let original = slot.extent(Resolution::Orig).ok_or_else(|| {
            ImgStoreError::Corrupt(format!("slot {} has no original content", index))
        })?;
        let bytes = open_file(&mut src.file)?.read_extent(original)?;

        let new_index = dst.insert(&bytes, &slot.id)?;
        for res in Resolution::DERIVATIVES {
            if slot.extent(res).is_some() {
                dst.ensure_variant(new_index, res)?;
            }
        }
    }

    dst.sync()?;
    Ok(dst)
}
