// Application state module
// Read-only view of configuration shared by every connection task

use std::path::{Path, PathBuf};

use super::types::{Config, SuffixRangeMode};

/// Application state
///
/// Nothing here is mutated after startup; requests share it through an `Arc`.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    root: PathBuf,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.server.root.clone(),
            config: config.clone(),
        }
    }

    /// Directory all request paths resolve under
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }

    #[inline]
    pub const fn suffix_range(&self) -> SuffixRangeMode {
        self.config.video.suffix_range
    }

    /// Streaming chunk size, never zero
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.config.video.chunk_size.max(1)
    }
}
