//! HTTP response building module
//!
//! Response body type plus builders for the fixed status-code responses.

use futures_util::StreamExt;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED,
    LOCATION,
};
use hyper::{Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

/// Body of every response: buffered for small bodies, streamed for files
///
/// The error type is `io::Error` so a failed disk read aborts the connection.
pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

/// Stream at most `len` bytes from the file's current position in
/// `chunk_size` reads
///
/// The file is owned by the body and closed when the body is dropped, which
/// includes the client going away mid-transfer.
pub fn file_body(file: File, len: u64, chunk_size: usize) -> ResponseBody {
    let stream = ReaderStream::with_capacity(file.take(len), chunk_size)
        .map(|chunk| chunk.map(Frame::data));
    BodyExt::boxed(StreamBody::new(stream))
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: Option<&str>) -> Response<ResponseBody> {
    let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    if let Some(value) = last_modified {
        builder = builder.header(LAST_MODIFIED, value);
    }
    builder
        .body(empty_body())
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 404 Not Found response (no body)
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("404", &e))
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, ALLOWED_METHODS)
        .body(full_body("405 Method Not Allowed"))
        .unwrap_or_else(|e| fallback("405", &e))
}

/// Build OPTIONS response (CORS preflight for cross-origin players)
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Range")
        .header(ACCESS_CONTROL_MAX_AGE, "86400")
        .body(empty_body())
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("416", &e))
}

/// Build 500 response for local I/O failures before any byte was sent
pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("500", &e))
}

/// Build 301 redirect, used to add the trailing slash to directory URLs
pub fn build_moved_permanently(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| fallback("301", &e))
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Log response build error and return a bare 500
pub fn fallback(status: &str, error: &hyper::http::Error) -> Response<ResponseBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
