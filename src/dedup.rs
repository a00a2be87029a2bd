//! Dedup Resolver
//!
//! Name and content deduplication for a freshly filled slot.
//!
//! ## Rules
//! - A valid slot with the same id is fatal (`DuplicateId`); names are never merged
//! - The lowest-index valid slot with the same digest becomes the alias source:
//!   the target shares its original bytes and any derivatives it already has
//! - Without a content match the original offset stays at 0, telling the
//!   caller to append fresh bytes

use crate::error::{ImgStoreError, Result};
use crate::storage::{Resolution, Slot};

/// What the resolver did to the target slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Slot whose storage the target now shares
    pub alias_of: Option<usize>,
}

impl DedupOutcome {
    pub fn aliased(&self) -> bool {
        self.alias_of.is_some()
    }
}

/// Resolve name and content collisions for `slots[target]`
///
/// Scans every valid slot other than the target in ascending order. The whole
/// table is scanned even after a content match so that a later id collision
/// is still reported.
pub fn resolve(slots: &mut [Slot], target: usize) -> Result<DedupOutcome> {
    if target >= slots.len() {
        return Err(ImgStoreError::InvalidArgument(format!(
            "slot index {} out of range ({} slots)",
            target,
            slots.len()
        )));
    }

    let mut alias_of = None;
    {
        let candidate = &slots[target];
        for (i, slot) in slots.iter().enumerate() {
            if i == target || !slot.valid {
                continue;
            }
            if slot.id == candidate.id {
                return Err(ImgStoreError::DuplicateId);
            }
            if alias_of.is_none() && slot.digest == candidate.digest {
                alias_of = Some(i);
            }
        }
    }

    match alias_of {
        Some(source) => {
            let (offset, size) = (slots[source].offset, slots[source].size);
            let slot = &mut slots[target];
            slot.offset = offset;
            for res in Resolution::DERIVATIVES {
                slot.size[res.index()] = size[res.index()];
            }
            tracing::debug!(
                "Slot {} ({}) aliases content of slot {}",
                target,
                slot.id,
                source
            );
        }
        None => {
            slots[target].offset[Resolution::Orig.index()] = 0;
        }
    }

    Ok(DedupOutcome { alias_of })
}
