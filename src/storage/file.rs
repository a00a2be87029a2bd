//! Store file I/O
//!
//! Positioned reads and writes of whole records against the open file.
//! Nothing here knows about slot selection or dedup; it only moves bytes.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use crate::error::{ImgStoreError, Result};

use super::layout::{Extent, Header, Slot, HEADER_SIZE, MAX_MAX_FILES, SLOT_SIZE};

/// How to open an existing store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Reads only; lazy derivative generation will fail with an I/O error
    ReadOnly,
    ReadWrite,
}

/// File position of slot `index`
pub fn slot_position(index: usize) -> u64 {
    HEADER_SIZE + SLOT_SIZE * index as u64
}

/// An open store file
#[derive(Debug)]
pub struct StoreFile {
    file: File,
    path: PathBuf,
}

impl StoreFile {
    /// Create (or truncate) a store file for reading and writing
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing store file
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(mode == OpenMode::ReadWrite)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the header
    pub fn read_header(&mut self) -> Result<Header> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(&mut buf)?;

        let header = Header::decode(&buf)?;
        if header.max_files > MAX_MAX_FILES {
            return Err(ImgStoreError::Corrupt(format!(
                "max_files {} exceeds limit {}",
                header.max_files, MAX_MAX_FILES
            )));
        }
        if header.num_files > header.max_files {
            return Err(ImgStoreError::Corrupt(format!(
                "num_files {} exceeds max_files {}",
                header.num_files, header.max_files
            )));
        }
        Ok(header)
    }

    /// Read exactly `max_files` slots following the header
    pub fn read_slots(&mut self, max_files: u32) -> Result<Vec<Slot>> {
        let count = max_files as usize;
        let mut raw = Vec::new();
        raw.try_reserve_exact(count * SLOT_SIZE as usize)?;
        raw.resize(count * SLOT_SIZE as usize, 0u8);

        self.file.seek(SeekFrom::Start(HEADER_SIZE))?;
        self.file.read_exact(&mut raw)?;

        let mut slots = Vec::new();
        slots.try_reserve_exact(count)?;
        for chunk in raw.chunks_exact(SLOT_SIZE as usize) {
            slots.push(Slot::decode(chunk)?);
        }
        Ok(slots)
    }

    /// Write header and the whole slot table in one pass (store creation)
    pub fn write_table(&mut self, header: &Header, slots: &[Slot]) -> Result<()> {
        let mut buf = BytesMut::with_capacity(slot_position(slots.len()) as usize);
        header.encode_into(&mut buf);
        for slot in slots {
            slot.encode_into(&mut buf);
        }
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&buf)?;
        self.file.flush()?;
        Ok(())
    }

    /// Rewrite the header in place
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&header.encode())?;
        Ok(())
    }

    /// Rewrite one slot record in place
    pub fn write_slot(&mut self, index: usize, slot: &Slot) -> Result<()> {
        self.file.seek(SeekFrom::Start(slot_position(index)))?;
        self.file.write_all(&slot.encode())?;
        Ok(())
    }

    /// Append content at the end of the file, returning its extent
    pub fn append(&mut self, bytes: &[u8]) -> Result<Extent> {
        let size = u32::try_from(bytes.len()).map_err(|_| {
            ImgStoreError::InvalidArgument(format!("content of {} bytes is too large", bytes.len()))
        })?;
        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(bytes)?;
        Ok(Extent { offset, size })
    }

    /// Read the bytes of a stored variant
    pub fn read_extent(&mut self, extent: Extent) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(extent.size as usize)?;
        buf.resize(extent.size as usize, 0u8);
        self.file.seek(SeekFrom::Start(extent.offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Current file length
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// fsync file contents and metadata
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}
