//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: LIST   - Payload: empty
//! - 0x02: READ   - Payload: id_len (4) + id + resolution name
//! - 0x03: INSERT - Payload: id_len (4) + id + image bytes
//! - 0x04: DELETE - Payload: id_len (4) + id
//! - 0x05: PING   - Payload: empty
//!
//! LIST, READ, INSERT and DELETE carry the same operations as the HTTP
//! endpoints `/imgStore/list`, `/imgStore/read`, `/imgStore/insert` and
//! `/imgStore/delete`.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - anything else: the stable error code, message in the payload

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
