//! Error types for imgstore
//!
//! Provides a unified error type for all operations. Every variant maps to a
//! stable numeric code so front ends can report distinct exit/status codes.

use thiserror::Error;

/// Result type alias using ImgStoreError
pub type Result<T> = std::result::Result<T, ImgStoreError>;

/// Unified error type for imgstore operations
#[derive(Debug, Error)]
pub enum ImgStoreError {
    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid image ID")]
    InvalidIdentifier,

    #[error("Invalid resolution name: {0}")]
    InvalidResolution(String),

    #[error("Invalid max_files number: {0}")]
    InvalidMaxFiles(u32),

    #[error("Invalid derivative resolution: {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store file: {0}")]
    Corrupt(String),

    #[error("Out of memory")]
    OutOfMemory,

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Existing image ID")]
    DuplicateId,

    #[error("File not found")]
    NotFound,

    #[error("imgStore is full")]
    FullStore,

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Image format error: {0}")]
    ImageFormat(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// An error status returned by a server
    #[error("{message}")]
    Remote { code: u8, message: String },
}

impl ImgStoreError {
    /// Stable numeric code for this error kind (never 0, which means success)
    ///
    /// `Corrupt` shares the I/O code: a misformatted file is reported as an
    /// I/O failure to the outside world.
    pub fn code(&self) -> u8 {
        match self {
            ImgStoreError::Io(_) | ImgStoreError::Corrupt(_) => 1,
            ImgStoreError::OutOfMemory => 2,
            ImgStoreError::InvalidArgument(_) => 3,
            ImgStoreError::InvalidIdentifier => 4,
            ImgStoreError::InvalidResolution(_) => 5,
            ImgStoreError::InvalidMaxFiles(_) => 6,
            ImgStoreError::InvalidDimensions { .. } => 7,
            ImgStoreError::FullStore => 8,
            ImgStoreError::NotFound => 9,
            ImgStoreError::DuplicateId => 10,
            ImgStoreError::ImageFormat(_) => 11,
            ImgStoreError::Protocol(_) => 12,
            ImgStoreError::Serialization(_) => 13,
            ImgStoreError::Remote { code, .. } => *code,
        }
    }
}

impl From<image::ImageError> for ImgStoreError {
    fn from(err: image::ImageError) -> Self {
        ImgStoreError::ImageFormat(err.to_string())
    }
}

impl From<serde_json::Error> for ImgStoreError {
    fn from(err: serde_json::Error) -> Self {
        ImgStoreError::Serialization(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for ImgStoreError {
    fn from(_: std::collections::TryReserveError) -> Self {
        ImgStoreError::OutOfMemory
    }
}
