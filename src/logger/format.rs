//! Access log format module
//!
//! Supports:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)

use chrono::Local;
use serde::Serialize;

use crate::config::AccessLogFormat;

/// Access log entry containing request/response information
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    /// Request path, query string included
    pub uri: String,
    /// HTTP version (1.0, 1.1)
    pub http_version: String,
    pub status: u16,
    /// Declared `Content-Length` of the response, not bytes actually sent;
    /// an aborted transfer still logs the full value
    pub content_length: u64,
    /// Raw `Range` header, if any
    pub range: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Time to produce the response head in microseconds
    pub request_time_us: u64,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    remote_addr: &'a str,
    time: String,
    method: &'a str,
    uri: &'a str,
    http_version: &'a str,
    status: u16,
    content_length: u64,
    range: Option<&'a str>,
    referer: Option<&'a str>,
    user_agent: Option<&'a str>,
    request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, uri: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            uri,
            http_version: "1.1".to_string(),
            status: 200,
            content_length: 0,
            range: None,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Combined => self.format_combined(),
            AccessLogFormat::Common => self.format_common(),
            AccessLogFormat::Json => self.format_json(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $content_length "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $content_length`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.http_version,
            self.status,
            self.content_length,
        )
    }

    fn format_json(&self) -> String {
        let line = JsonLine {
            remote_addr: &self.remote_addr,
            time: self.time.to_rfc3339(),
            method: &self.method,
            uri: &self.uri,
            http_version: &self.http_version,
            status: self.status,
            content_length: self.content_length,
            range: self.range.as_deref(),
            referer: self.referer.as_deref(),
            user_agent: self.user_agent.as_deref(),
            request_time_us: self.request_time_us,
        };
        serde_json::to_string(&line).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.7".to_string(),
            "GET".to_string(),
            "/movies/trailer.mp4".to_string(),
        );
        entry.status = 206;
        entry.content_length = 100;
        entry.range = Some("bytes=100-199".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry
    }

    #[test]
    fn test_common_format() {
        let log = sample().format(AccessLogFormat::Common);
        assert!(log.starts_with("192.168.1.7 - - ["));
        assert!(log.ends_with("\"GET /movies/trailer.mp4 HTTP/1.1\" 206 100"));
    }

    #[test]
    fn test_combined_format() {
        let log = sample().format(AccessLogFormat::Combined);
        assert!(log.ends_with("206 100 \"-\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_json_format() {
        let log = sample().format(AccessLogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["status"], 206);
        assert_eq!(value["content_length"], 100);
        assert!(value.get("body_bytes").is_none());
        assert_eq!(value["range"], "bytes=100-199");
        assert_eq!(value["referer"], serde_json::Value::Null);
        assert_eq!(value["uri"], "/movies/trailer.mp4");
    }
}
