//! Local HTTP server for video files.
//!
//! Paths ending in `.mp4`, `.webm` or `.ogg` are served with byte-range
//! support so browser players can seek; every other path is plain static file
//! serving from the configured root.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use server::{Server, ServerError, ShutdownHandle};
