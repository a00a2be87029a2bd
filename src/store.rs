//! Store Handle
//!
//! Owns the open file, the in-memory header and the full slot table, and
//! mediates every read and write.
//!
//! ## Consistency
//! There is no write-ahead log. Insert rewrites the header and then its slot;
//! delete rewrites its slot and then the header. A crash between the two
//! writes leaves the counters in the header out of step with the slot table.
//! Only delete rolls back its in-memory changes when a write fails.

use std::path::Path;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::dedup;
use crate::digest::ContentDigest;
use crate::error::{ImgStoreError, Result};
use crate::image_codec::{ImageCodec, JpegCodec};
use crate::storage::{Header, OpenMode, Resolution, Slot, StoreFile, MAX_ID_LEN};

/// Index of a metadata slot
pub type SlotIndex = usize;

/// An open image store
///
/// Single caller, one operation at a time. Front ends that serve concurrent
/// requests must serialize access to the whole handle.
pub struct ImgStore {
    /// `None` once closed
    pub(crate) file: Option<StoreFile>,

    pub(crate) header: Header,

    /// Always exactly `header.max_files` long while open
    pub(crate) slots: Vec<Slot>,

    pub(crate) codec: Arc<dyn ImageCodec>,
}

impl ImgStore {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a new store file with an empty slot table
    pub fn create(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        Self::create_with_codec(path, config, Arc::new(JpegCodec::default()))
    }

    pub fn create_with_codec(
        path: impl AsRef<Path>,
        config: &StoreConfig,
        codec: Arc<dyn ImageCodec>,
    ) -> Result<Self> {
        let path = path.as_ref();
        config.validate()?;

        let header = Header::new(config);
        let mut slots = Vec::new();
        slots.try_reserve_exact(header.max_files as usize)?;
        slots.resize(header.max_files as usize, Slot::default());

        let mut file = StoreFile::create(path)?;
        file.write_table(&header, &slots)?;

        tracing::info!(
            "Created store {} (max_files={}, thumb={}x{}, small={}x{})",
            path.display(),
            header.max_files,
            header.thumb_res.width,
            header.thumb_res.height,
            header.small_res.width,
            header.small_res.height
        );

        Ok(Self {
            file: Some(file),
            header,
            slots,
            codec,
        })
    }

    /// Open an existing store, loading the header and the whole slot table
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_with_codec(path, mode, Arc::new(JpegCodec::default()))
    }

    pub fn open_with_codec(
        path: impl AsRef<Path>,
        mode: OpenMode,
        codec: Arc<dyn ImageCodec>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut file = StoreFile::open(path, mode)?;
        let header = file.read_header()?;
        let slots = file.read_slots(header.max_files)?;

        let live = slots.iter().filter(|s| s.valid).count();
        if live != header.num_files as usize {
            tracing::warn!(
                "Store {}: header counts {} files but {} slots are valid",
                path.display(),
                header.num_files,
                live
            );
        }

        tracing::info!(
            "Opened store {} ({:?}, {}/{} files, version {})",
            path.display(),
            mode,
            header.num_files,
            header.max_files,
            header.version
        );

        Ok(Self {
            file: Some(file),
            header,
            slots,
            codec,
        })
    }

    /// Release the slot table and close the file. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            tracing::debug!("Closed store");
        }
        self.slots = Vec::new();
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert an image under `id`, returning the slot it landed in
    ///
    /// Steps:
    /// 1. Pick the lowest free slot, rejecting an id already in use
    /// 2. Fill the slot with id, digest and size
    /// 3. Dedup against existing content
    /// 4. Read the original dimensions
    /// 5. Append the bytes unless they are shared with another slot
    /// 6. Mark valid, bump counters, persist header then slot
    pub fn insert(&mut self, bytes: &[u8], id: &str) -> Result<SlotIndex> {
        validate_id(id)?;
        if bytes.is_empty() {
            return Err(ImgStoreError::InvalidArgument("empty image".to_string()));
        }
        let size = u32::try_from(bytes.len()).map_err(|_| {
            ImgStoreError::InvalidArgument(format!("image of {} bytes is too large", bytes.len()))
        })?;
        self.ensure_open()?;
        if self.header.is_full() {
            return Err(ImgStoreError::FullStore);
        }

        let index = self.select_slot(id)?;
        tracing::debug!("Inserting {} ({} bytes) into slot {}", id, bytes.len(), index);

        {
            let slot = &mut self.slots[index];
            *slot = Slot::default();
            slot.id = id.to_string();
            slot.digest = ContentDigest::of(bytes);
            slot.size[Resolution::Orig.index()] = size;
        }

        let outcome = dedup::resolve(&mut self.slots, index)?;
        let dims = self.codec.decode_dimensions(bytes)?;

        if !outcome.aliased() {
            let extent = open_file(&mut self.file)?.append(bytes)?;
            self.slots[index].set_extent(Resolution::Orig, extent);
        }

        let slot = &mut self.slots[index];
        slot.original_dims = dims;
        slot.valid = true;
        self.header.num_files += 1;
        self.header.version = self.header.version.wrapping_add(1);

        self.persist_header()?;
        self.persist_slot(index)?;

        Ok(index)
    }

    /// Lowest-index non-valid slot; fails on an id collision with a valid slot
    fn select_slot(&self, id: &str) -> Result<SlotIndex> {
        let mut free = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.valid {
                if slot.id == id {
                    return Err(ImgStoreError::DuplicateId);
                }
            } else if free.is_none() {
                free = Some(i);
            }
        }
        free.ok_or(ImgStoreError::FullStore)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Read variant `res` of image `id`, generating it first if missing
    pub fn read(&mut self, id: &str, res: Resolution) -> Result<Vec<u8>> {
        validate_id(id)?;
        let index = self.find(id)?;

        if self.slots[index].extent(res).is_none() {
            self.ensure_variant(index, res)?;
        }

        let extent = self.slots[index].extent(res).ok_or_else(|| {
            ImgStoreError::Corrupt(format!("slot {} has no {} content", index, res))
        })?;
        open_file(&mut self.file)?.read_extent(extent)
    }

    /// Slot index of the valid entry named `id`
    ///
    /// Stops once `num_files` valid slots have been inspected.
    pub fn find(&self, id: &str) -> Result<SlotIndex> {
        if self.header.num_files == 0 {
            return Err(ImgStoreError::NotFound);
        }
        let mut seen = 0u32;
        for (i, slot) in self.slots.iter().enumerate() {
            if !slot.valid {
                continue;
            }
            if slot.id == id {
                return Ok(i);
            }
            seen += 1;
            if seen >= self.header.num_files {
                break;
            }
        }
        Err(ImgStoreError::NotFound)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Tombstone the entry named `id`
    ///
    /// The content bytes stay in the file until compaction. If either write
    /// fails the in-memory state is restored before returning the error.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        validate_id(id)?;
        if self.header.num_files == 0 {
            return Err(ImgStoreError::NotFound);
        }
        self.ensure_open()?;

        let index = self
            .slots
            .iter()
            .position(|s| s.valid && s.id == id)
            .ok_or(ImgStoreError::NotFound)?;

        self.slots[index].valid = false;
        self.header.num_files -= 1;
        self.header.version = self.header.version.wrapping_add(1);

        let written = self
            .persist_slot(index)
            .and_then(|()| self.persist_header());

        if let Err(e) = written {
            tracing::warn!("Delete of {} failed, rolling back: {}", id, e);
            self.slots[index].valid = true;
            self.header.num_files += 1;
            self.header.version = self.header.version.wrapping_sub(1);
            return Err(e);
        }

        tracing::debug!("Deleted {} (slot {})", id, index);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn num_files(&self) -> u32 {
        self.header.num_files
    }

    /// Creation parameters, as recorded in the header
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            name: self.header.name.clone(),
            max_files: self.header.max_files,
            thumb_res: self.header.thumb_res,
            small_res: self.header.small_res,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// Current length of the store file in bytes
    pub fn file_len(&self) -> Result<u64> {
        match &self.file {
            Some(file) => file.file_len(),
            None => Err(closed()),
        }
    }

    /// Flush everything to stable storage
    pub fn sync(&mut self) -> Result<()> {
        open_file(&mut self.file)?.sync()
    }

    // =========================================================================
    // Record persistence
    // =========================================================================

    pub(crate) fn persist_header(&mut self) -> Result<()> {
        open_file(&mut self.file)?.write_header(&self.header)
    }

    pub(crate) fn persist_slot(&mut self, index: SlotIndex) -> Result<()> {
        open_file(&mut self.file)?.write_slot(index, &self.slots[index])
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.file.is_some() {
            Ok(())
        } else {
            Err(closed())
        }
    }
}

impl Drop for ImgStore {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ImgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImgStore")
            .field("path", &self.path())
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// Check an image id coming from a front end
///
/// Ids are 1..=127 bytes and may not contain NUL (the on-disk field is
/// NUL-terminated).
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_ID_LEN || id.contains('\0') {
        return Err(ImgStoreError::InvalidIdentifier);
    }
    Ok(())
}

pub(crate) fn open_file(file: &mut Option<StoreFile>) -> Result<&mut StoreFile> {
    file.as_mut().ok_or_else(closed)
}

fn closed() -> ImgStoreError {
    ImgStoreError::InvalidArgument("store is closed".to_string())
}
