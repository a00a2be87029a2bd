//! Command definitions
//!
//! Represents requests from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    List = 0x01,
    Read = 0x02,
    Insert = 0x03,
    Delete = 0x04,
    Ping = 0x05,
}

/// A parsed command
///
/// Resolution names travel as text and are parsed by the server, so an
/// unknown name is reported as an invalid resolution rather than a protocol
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the ids of all stored images (JSON)
    List,

    /// Read one variant of an image
    Read { id: String, resolution: String },

    /// Insert a new image
    Insert { id: String, image: Vec<u8> },

    /// Delete an image
    Delete { id: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::List => CommandType::List,
            Command::Read { .. } => CommandType::Read,
            Command::Insert { .. } => CommandType::Insert,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }
}
