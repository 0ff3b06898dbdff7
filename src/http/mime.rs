//! MIME type detection module
//!
//! Recognizes the video extensions that get range-aware delivery and guesses
//! a `Content-Type` for everything else.

use std::path::Path;

/// Video container served by the range-aware responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoKind {
    Mp4,
    Webm,
    Ogg,
}

impl VideoKind {
    /// Classify a request path by its extension (ASCII case-insensitive)
    ///
    /// # Examples
    /// ```
    /// use vidserve::http::mime::VideoKind;
    /// assert_eq!(VideoKind::from_path("/movies/trailer.webm"), Some(VideoKind::Webm));
    /// assert_eq!(VideoKind::from_path("/movies/CLIP.MP4"), Some(VideoKind::Mp4));
    /// assert_eq!(VideoKind::from_path("/index.html"), None);
    /// ```
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("mp4") {
            Some(Self::Mp4)
        } else if ext.eq_ignore_ascii_case("webm") {
            Some(Self::Webm)
        } else if ext.eq_ignore_ascii_case("ogg") {
            Some(Self::Ogg)
        } else {
            None
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
            Self::Ogg => "video/ogg",
        }
    }
}

/// Guess `Content-Type` for a file served by the generic static responder
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md" | "log") => "text/plain; charset=utf-8",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",

        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Video files reached without the video route (e.g. index lookups)
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg" | "ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",

        // Subtitles and playlists used next to videos
        Some("vtt") => "text/vtt",
        Some("srt") => "application/x-subrip",
        Some("m3u8") => "application/vnd.apple.mpegurl",

        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",

        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",

        _ => "application/octet-stream",
    }
}
