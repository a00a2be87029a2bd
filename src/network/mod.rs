//! Network Module
//!
//! TCP server and client for the binary protocol.
//!
//! ## Architecture
//! - Single acceptor thread polling a non-blocking listener
//! - Fixed worker pool fed through a bounded `crossbeam` channel
//! - One store handle behind a `parking_lot::Mutex`; each request holds the
//!   lock for its whole operation

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::{execute, Connection, SharedStore};
pub use server::{Server, ShutdownHandle};
