//! Derivative Cache
//!
//! Resized variants are produced on first read and appended to the store.
//! A cache fill changes neither `num_files` nor `version`, so only the
//! affected slot record is rewritten.

use crate::error::{ImgStoreError, Result};
use crate::storage::Resolution;
use crate::store::{open_file, ImgStore, SlotIndex};

impl ImgStore {
    /// Make sure variant `res` of slot `index` is stored
    ///
    /// No-op for the original and for variants already present.
    pub fn ensure_variant(&mut self, index: SlotIndex, res: Resolution) -> Result<()> {
        let Some(dims) = self.header.derivative_dims(res) else {
            return Ok(());
        };

        let slot = match self.slots.get(index) {
            Some(slot) if slot.valid => slot,
            _ => {
                return Err(ImgStoreError::InvalidArgument(format!(
                    "slot {} is not a valid entry",
                    index
                )))
            }
        };
        if slot.extent(res).is_some() {
            return Ok(());
        }
        let original = slot.extent(Resolution::Orig).ok_or_else(|| {
            ImgStoreError::Corrupt(format!("slot {} has no original content", index))
        })?;

        let file = open_file(&mut self.file)?;
        let bytes = file.read_extent(original)?;
        let resized = self.codec.resize_and_encode(&bytes, dims)?;
        let extent = file.append(&resized)?;

        self.slots[index].set_extent(res, extent);
        self.persist_slot(index)?;

        tracing::debug!(
            "Generated {} for slot {} ({} bytes at offset {})",
            res,
            index,
            extent.size,
            extent.offset
        );
        Ok(())
    }
}
