// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub video: VideoConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory every request path resolves under
    pub root: PathBuf,
    pub workers: Option<usize>,
}

/// Range-aware video delivery settings
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    /// Read granularity when streaming a byte window
    pub chunk_size: usize,
    pub suffix_range: SuffixRangeMode,
}

/// How `bytes=-N` is interpreted
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuffixRangeMode {
    /// Empty start means offset 0, so `bytes=-N` covers `[0, N]`
    #[default]
    Literal,
    /// RFC 7233 suffix: the final N bytes of the file
    LastBytes,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common or json)
    pub access_log_format: AccessLogFormat,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessLogFormat {
    #[default]
    Combined,
    Common,
    Json,
}

/// Connection-level settings
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a client to send request headers
    pub header_read_timeout: u64,
    pub max_connections: Option<usize>,
}
