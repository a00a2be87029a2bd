//! Blocking client
//!
//! Speaks the binary protocol to an `imgstore-server`. Error statuses come
//! back as `ImgStoreError::Remote` carrying the server's code and message.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{ImgStoreError, Result};
use crate::protocol::{read_response, write_command, Command, Response};
use crate::storage::Resolution;

pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Apply the same timeout to reads and writes
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send a command and wait for the raw response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// JSON listing of the store
    pub fn list(&mut self) -> Result<String> {
        let payload = self.call(&Command::List)?;
        String::from_utf8(payload)
            .map_err(|_| ImgStoreError::Protocol("listing is not valid UTF-8".to_string()))
    }

    pub fn read(&mut self, id: &str, res: Resolution) -> Result<Vec<u8>> {
        self.call(&Command::Read {
            id: id.to_string(),
            resolution: res.name().to_string(),
        })
    }

    pub fn insert(&mut self, id: &str, image: &[u8]) -> Result<()> {
        self.call(&Command::Insert {
            id: id.to_string(),
            image: image.to_vec(),
        })
        .map(drop)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.call(&Command::Delete { id: id.to_string() }).map(drop)
    }

    pub fn ping(&mut self) -> Result<()> {
        self.call(&Command::Ping).map(drop)
    }

    fn call(&mut self, command: &Command) -> Result<Vec<u8>> {
        let response = self.request(command)?;
        if response.status.is_ok() {
            Ok(response.payload.unwrap_or_default())
        } else {
            Err(ImgStoreError::Remote {
                code: response.status as u8,
                message: response.message(),
            })
        }
    }
}
