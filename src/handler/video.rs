//! Range-aware video responder
//!
//! Serves `.mp4`/`.webm`/`.ogg` files with `Accept-Ranges`, single byte-range
//! support and a permissive CORS origin so cross-origin players can seek.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::handler::static_files::resolve_path;
use crate::http::{self, response, ByteRange, RangeParseResult, ResponseBody, VideoKind};
use crate::logger;
use hyper::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use std::io::{ErrorKind, SeekFrom};
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncSeekExt;

/// Serve a video file, honoring a single `Range: bytes=` window
pub async fn serve(
    ctx: &RequestContext<'_>,
    kind: VideoKind,
    state: &AppState,
) -> Response<ResponseBody> {
    let Some(file_path) = resolve_path(state.root(), ctx.path).await else {
        return http::build_404_response();
    };

    // Size is read on every request, never cached
    let file_size = match fs::metadata(&file_path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => return http::build_404_response(),
    };

    let window = match http::parse_range_header(ctx.range_header, file_size, state.suffix_range())
    {
        RangeParseResult::Valid(range) => Some(range),
        RangeParseResult::NotSatisfiable => return http::build_416_response(file_size),
        RangeParseResult::Malformed => {
            logger::log_warning(&format!(
                "Ignoring malformed Range header {:?} for {}",
                ctx.range_header.unwrap_or_default(),
                ctx.path
            ));
            None
        }
        RangeParseResult::None => None,
    };

    let (start, content_length) = window.map_or((0, file_size), |r| (r.start, r.len()));

    let body = if ctx.is_head {
        response::empty_body()
    } else {
        match open_at(&file_path, start).await {
            Ok(file) => response::file_body(file, content_length, state.chunk_size()),
            Err(e) if e.kind() == ErrorKind::NotFound => return http::build_404_response(),
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to open '{}' at offset {start}: {e}",
                    file_path.display()
                ));
                return http::build_500_response();
            }
        }
    };

    build_video_response(kind, window, file_size, content_length, body)
}

/// Open the file and position it at `start`
async fn open_at(path: &Path, start: u64) -> std::io::Result<File> {
    let mut file = File::open(path).await?;
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }
    Ok(file)
}

/// 200 for the whole file, 206 with `Content-Range` for a window
fn build_video_response(
    kind: VideoKind,
    window: Option<ByteRange>,
    file_size: u64,
    content_length: u64,
    body: ResponseBody,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .header(CONTENT_TYPE, kind.content_type())
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");

    builder = match window {
        Some(range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(CONTENT_RANGE, range.content_range(file_size)),
        None => builder.status(StatusCode::OK),
    };

    builder
        .body(body)
        .unwrap_or_else(|e| response::fallback("video", &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SuffixRangeMode};
    use http_body_util::BodyExt;

    fn sample_bytes() -> Vec<u8> {
        (0..1000u32).map(|i| (i % 251) as u8).collect()
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        state: AppState,
    }

    fn fixture(mode: SuffixRangeMode) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("movie.mp4"), sample_bytes()).unwrap();
        std::fs::write(dir.path().join("movie.ogg"), sample_bytes()).unwrap();
        std::fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let mut cfg = Config::defaults().unwrap();
        cfg.server.root = dir.path().to_path_buf();
        cfg.video.suffix_range = mode;
        cfg.video.chunk_size = 64;
        Fixture {
            state: AppState::new(&cfg),
            _dir: dir,
        }
    }

    async fn get(
        fx: &Fixture,
        path: &str,
        range: Option<&str>,
        is_head: bool,
    ) -> (Response<()>, Vec<u8>) {
        let kind = VideoKind::from_path(path).unwrap();
        let ctx = RequestContext {
            path,
            raw_path: path,
            is_head,
            range_header: range,
            if_modified_since: None,
        };
        let resp = serve(&ctx, kind, &fx.state).await;
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes().to_vec();
        (Response::from_parts(parts, ()), bytes)
    }

    #[tokio::test]
    async fn test_full_file_without_range() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", None, false).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "1000");
        assert_eq!(resp.headers()[ACCEPT_RANGES], "bytes");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(resp.headers().get(CONTENT_RANGE).is_none());
        assert_eq!(body, sample_bytes());
    }

    #[tokio::test]
    async fn test_bounded_range() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=100-199"), false).await;

        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 100-199/1000");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "100");
        assert_eq!(body, &sample_bytes()[100..=199]);
    }

    #[tokio::test]
    async fn test_open_ended_range() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=500-"), false).await;

        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 500-999/1000");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "500");
        assert_eq!(body, &sample_bytes()[500..]);
    }

    #[tokio::test]
    async fn test_empty_start_literal_mode() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=-200"), false).await;

        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 0-200/1000");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "201");
        assert_eq!(body, &sample_bytes()[..=200]);
    }

    #[tokio::test]
    async fn test_empty_start_last_bytes_mode() {
        let fx = fixture(SuffixRangeMode::LastBytes);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=-200"), false).await;

        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 800-999/1000");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "200");
        assert_eq!(body, &sample_bytes()[800..]);
    }

    #[tokio::test]
    async fn test_content_type_follows_extension() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, _) = get(&fx, "/movie.ogg", Some("bytes=0-9"), false).await;
        assert_eq!(resp.headers()[CONTENT_TYPE], "video/ogg");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_without_body() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/absent.mp4", Some("bytes=0-9"), false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body.is_empty());

        // A directory named like a video is not a file
        let (resp, _) = get(&fx, "/folder.mp4", None, false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_range_serves_whole_file() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=abc-def"), false).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body.len(), 1000);
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=1000-1100"), false).await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */1000");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_head_sends_headers_only() {
        let fx = fixture(SuffixRangeMode::Literal);
        let (resp, body) = get(&fx, "/movie.mp4", Some("bytes=10-19"), true).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "10");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_range_is_identical() {
        let fx = fixture(SuffixRangeMode::Literal);
        let first = get(&fx, "/movie.mp4", Some("bytes=250-749"), false).await;
        let second = get(&fx, "/movie.mp4", Some("bytes=250-749"), false).await;
        assert_eq!(first.1, second.1);
        assert_eq!(first.0.headers(), second.0.headers());
    }
}
