// Configuration module entry point
// Loads layered configuration and holds per-process request state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    AccessLogFormat, Config, LoggingConfig, PerformanceConfig, ServerConfig, SuffixRangeMode,
    VideoConfig,
};

/// Config file looked up when no path is given (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "vidserve";

/// Environment variable prefix, e.g. `VIDSERVE_SERVER__PORT=9000`
const ENV_PREFIX: &str = "VIDSERVE";

impl Config {
    /// Load configuration from the default file name, environment and defaults
    ///
    /// A missing default file is not an error.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_layered(DEFAULT_CONFIG_PATH, false)
    }

    /// Load configuration from specified file path (file must exist)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, true)
    }

    fn load_layered(config_path: &str, required: bool) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, matching the classic `:8000` in the working directory
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", ".")?
            .set_default("video.chunk_size", 8192)?
            .set_default("video.suffix_range", "literal")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address '{}:{}': {e}", self.server.host, self.server.port))
    }
}
