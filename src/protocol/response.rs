//! Response definitions
//!
//! Represents responses to clients. The status byte is 0 on success and the
//! error's stable code otherwise.

use crate::error::{ImgStoreError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    Io = 1,
    OutOfMemory = 2,
    InvalidArgument = 3,
    InvalidIdentifier = 4,
    InvalidResolution = 5,
    InvalidMaxFiles = 6,
    InvalidDimensions = 7,
    FullStore = 8,
    NotFound = 9,
    DuplicateId = 10,
    ImageFormat = 11,
    Protocol = 12,
    Serialization = 13,
}

impl Status {
    /// Decode a status byte
    pub fn from_code(code: u8) -> Option<Self> {
        let status = match code {
            0 => Status::Ok,
            1 => Status::Io,
            2 => Status::OutOfMemory,
            3 => Status::InvalidArgument,
            4 => Status::InvalidIdentifier,
            5 => Status::InvalidResolution,
            6 => Status::InvalidMaxFiles,
            7 => Status::InvalidDimensions,
            8 => Status::FullStore,
            9 => Status::NotFound,
            10 => Status::DuplicateId,
            11 => Status::ImageFormat,
            12 => Status::Protocol,
            13 => Status::Serialization,
            _ => return None,
        };
        Some(status)
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl From<&ImgStoreError> for Status {
    fn from(err: &ImgStoreError) -> Self {
        Status::from_code(err.code()).unwrap_or(Status::Io)
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (image bytes, JSON listing, or error message)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an error response carrying the error's message
    pub fn error(err: &ImgStoreError) -> Self {
        Self {
            status: Status::from(err),
            payload: Some(err.to_string().into_bytes()),
        }
    }

    pub fn from_result(result: Result<Option<Vec<u8>>>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(e) => Self::error(&e),
        }
    }

    /// Payload interpreted as an error message
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}
