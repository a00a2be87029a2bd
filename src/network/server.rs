//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::store::ImgStore;

use super::connection::{Connection, SharedStore};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP server for one image store
pub struct Server {
    config: Config,
    store: SharedStore,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

/// Cloneable handle that stops a running server
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Server {
    /// Bind `config.listen_addr` and take ownership of the store
    pub fn bind(config: Config, store: ImgStore) -> Result<Self> {
        Self::with_shared_store(config, Arc::new(Mutex::new(store)))
    }

    /// Bind with a store handle that may also be used elsewhere
    pub fn with_shared_store(config: Config, store: SharedStore) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Start the server (blocking)
    ///
    /// Returns once shutdown has been requested and every worker has
    /// finished its current connection.
    pub fn run(&self) -> Result<()> {
        let workers = self.config.worker_threads.max(1);
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_pending_connections.max(1));

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            handles.push(self.spawn_worker(i, rx.clone())?);
        }
        drop(rx);

        tracing::info!("Server running with {} workers", workers);

        let accepted = self.accept_loop(&tx);

        // Closing the channel lets the workers drain and exit
        drop(tx);
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        accepted
    }

    fn accept_loop(&self, tx: &channel::Sender<TcpStream>) -> Result<()> {
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::debug!("Accepted connection from {}", addr);
                    stream.set_nonblocking(false)?;
                    if tx.send(stream).is_err() {
                        tracing::error!("All workers have exited, stopping acceptor");
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let store = Arc::clone(&self.store);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("imgstore-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    let served = Connection::new(stream, Arc::clone(&store)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = served {
                        tracing::warn!("Connection closed with error: {}", e);
                    }
                }
                tracing::trace!("Worker {} exiting", id);
            })?;

        Ok(handle)
    }
}
