// Server error module
// Startup and lifecycle failures; request-level problems never reach here

use std::io;
use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("{0}")]
    InvalidAddress(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file: {0}")]
    Logger(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
