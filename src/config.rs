//! Configuration for imgstore
//!
//! Centralized configuration with sensible defaults.

use crate::error::{ImgStoreError, Result};
use crate::storage::{
    Dimensions, DEFAULT_STORE_NAME, MAX_MAX_FILES, MAX_SMALL_RES, MAX_THUMB_RES,
};

/// Main configuration for an imgstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration (fixed at creation time)
    // -------------------------------------------------------------------------
    /// Display name written into the header (truncated to 31 bytes)
    pub store_name: String,

    /// Number of metadata slots
    pub max_files: u32,

    /// Bounding box for thumbnails
    pub thumb_res: Dimensions,

    /// Bounding box for small images
    pub small_res: Dimensions,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub worker_threads: usize,

    /// Max accepted connections waiting for a worker
    pub max_pending_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// The creation-time parameters of a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub name: String,
    pub max_files: u32,
    pub thumb_res: Dimensions,
    pub small_res: Dimensions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            max_files: 10,
            thumb_res: Dimensions::new(64, 64),
            small_res: Dimensions::new(256, 256),
            listen_addr: "127.0.0.1:8000".to_string(),
            worker_threads: 4,
            max_pending_connections: 64,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The subset of the config that is persisted in a store header
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            name: self.store_name.clone(),
            max_files: self.max_files,
            thumb_res: self.thumb_res,
            small_res: self.small_res,
        }
    }
}

impl Config {
    /// Check the store creation limits carried by this config
    pub fn validate(&self) -> Result<()> {
        self.store_config().validate()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Config::default().store_config()
    }
}

impl StoreConfig {
    /// Check the creation-time limits
    pub fn validate(&self) -> Result<()> {
        if self.max_files == 0 || self.max_files > MAX_MAX_FILES {
            return Err(ImgStoreError::InvalidMaxFiles(self.max_files));
        }
        check_dims(self.thumb_res, MAX_THUMB_RES)?;
        check_dims(self.small_res, MAX_SMALL_RES)?;
        Ok(())
    }
}

fn check_dims(dims: Dimensions, limit: Dimensions) -> Result<()> {
    if dims.width == 0 || dims.height == 0 || dims.width > limit.width || dims.height > limit.height {
        return Err(ImgStoreError::InvalidDimensions {
            width: dims.width,
            height: dims.height,
        });
    }
    Ok(())
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store display name
    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.config.store_name = name.into();
        self
    }

    /// Set the number of metadata slots
    pub fn max_files(mut self, max_files: u32) -> Self {
        self.config.max_files = max_files;
        self
    }

    /// Set the thumbnail bounding box
    pub fn thumb_res(mut self, width: u16, height: u16) -> Self {
        self.config.thumb_res = Dimensions::new(width, height);
        self
    }

    /// Set the small-image bounding box
    pub fn small_res(mut self, width: u16, height: u16) -> Self {
        self.config.small_res = Dimensions::new(width, height);
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the connection queue depth
    pub fn max_pending_connections(mut self, count: usize) -> Self {
        self.config.max_pending_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
