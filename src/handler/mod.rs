//! Request handler module
//!
//! Routing dispatch plus the two responders it chooses between: range-aware
//! video delivery and generic static file serving.

pub mod router;
pub mod static_files;
pub mod video;

// Re-export main entry point
pub use router::handle_request;
