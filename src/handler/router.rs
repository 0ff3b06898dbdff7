//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, path decoding,
//! and dispatch to the video or static responder.

use crate::config::AppState;
use crate::handler::{static_files, video};
use crate::http::{self, ResponseBody, VideoKind};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{
    HeaderName, CONTENT_LENGTH, IF_MODIFIED_SINCE, RANGE, REFERER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Percent-decoded path
    pub path: &'a str,
    /// Path as received, used when echoing it back in a `Location`
    pub raw_path: &'a str,
    pub is_head: bool,
    pub range_header: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// Never fails: every outcome, including I/O problems, becomes a response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // Only the head matters; request bodies are ignored
    let (parts, _) = req.into_parts();
    let response = route_request(&parts, &state).await;

    if state.access_log() {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

async fn route_request(req: &Parts, state: &AppState) -> Response<ResponseBody> {
    let method = &req.method;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method) {
        return resp;
    }

    // 2. Decode path
    let raw_path = req.uri.path();
    let path: Cow<'_, str> = match urlencoding::decode(raw_path) {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!("Undecodable request path '{raw_path}': {e}"));
            return http::build_404_response();
        }
    };

    let ctx = RequestContext {
        path: &path,
        raw_path,
        is_head: *method == Method::HEAD,
        range_header: req.headers.get(RANGE).and_then(|v| v.to_str().ok()),
        if_modified_since: req
            .headers
            .get(IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok()),
    };

    // 3. Video extensions get range-aware delivery, everything else is static
    match VideoKind::from_path(ctx.path) {
        Some(kind) => video::serve(&ctx, kind, state).await,
        None => static_files::serve(&ctx, state).await,
    }
}

/// Return the response for anything other than GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn log_access(
    req: &Parts,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: HeaderName| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let uri = req
        .uri
        .path_and_query()
        .map_or_else(|| req.uri.path().to_string(), ToString::to_string);

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), req.method.to_string(), uri);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.content_length = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.range = header(RANGE);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, state.config.logging.access_log_format);
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::{ACCEPT_RANGES, CONTENT_RANGE, CONTENT_TYPE};
    use hyper::StatusCode;

    fn state_for(root: &std::path::Path) -> Arc<AppState> {
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root = root.to_path_buf();
        cfg.logging.access_log = false;
        Arc::new(AppState::new(&cfg))
    }

    fn request(method: Method, uri: &str, range: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(r) = range {
            builder = builder.header(RANGE, r);
        }
        builder.body(()).unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<ResponseBody> {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        handle_request(req, Arc::clone(state), peer).await.unwrap()
    }

    #[tokio::test]
    async fn test_video_path_dispatches_to_range_responder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.webm"), vec![7u8; 1000]).unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/clip.webm", Some("bytes=100-199"))).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_TYPE], "video/webm");
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 100-199/1000");
    }

    #[tokio::test]
    async fn test_other_paths_dispatch_to_static_responder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/notes.txt", Some("bytes=0-1"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert!(resp.headers().get(CONTENT_RANGE).is_none());
        assert!(resp.headers().get(ACCEPT_RANGES).is_none());
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_percent_encoded_video_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my clip.mp4"), vec![1u8; 10]).unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/my%20clip.mp4?t=3", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "video/mp4");
    }

    #[tokio::test]
    async fn test_method_handling() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::POST, "/clip.mp4", None)).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = send(&state, request(Method::OPTIONS, "/clip.mp4", None)).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
