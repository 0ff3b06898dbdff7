// Server module entry point
// Owns the listening socket and the accept loop, with an explicit stop

pub mod connection;
mod error;
pub mod listener;
pub mod signal;

pub use error::ServerError;
pub use listener::create_listener;

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::{AppState, Config};
use crate::logger;

/// A bound server. Nothing is accepted until [`Server::run`] is awaited.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
}

/// Cloneable handle that stops a running [`Server`]
#[derive(Clone)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    /// Stop accepting connections. Safe to call before `run` starts.
    pub fn shutdown(&self) {
        // notify_one keeps a permit if the loop is not waiting yet
        self.notify.notify_one();
    }
}

impl Server {
    /// Bind the configured address. Port 0 picks an ephemeral port.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = config
            .get_socket_addr()
            .map_err(ServerError::InvalidAddress)?;
        let listener =
            create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(AppState::new(config)),
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(Notify::new()),
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            notify: Arc::clone(&self.shutdown),
        }
    }

    /// Accept connections until shut down
    ///
    /// Accept errors (e.g. running out of file descriptors) are logged and the
    /// loop keeps going. Connections already being served finish on their own.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            connection::accept_connection(
                                stream,
                                peer_addr,
                                &self.state,
                                &self.active_connections,
                            );
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                        }
                    }
                }

                () = self.shutdown.notified() => break,
            }
        }

        drop(self.listener);
        logger::log_server_stopped(&self.local_addr);
        Ok(())
    }
}
