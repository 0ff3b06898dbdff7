//! Static file serving module
//!
//! The generic collaborator for every non-video path: path resolution under
//! the root, index files, directory listings and plain file downloads.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, response, ResponseBody};
use crate::logger;
use chrono::{DateTime, NaiveDateTime, Utc};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED};
use hyper::{Response, StatusCode};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Serve a non-video request path
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let Some(path) = resolve_path(state.root(), ctx.path).await else {
        return http::build_404_response();
    };

    let Ok(metadata) = fs::metadata(&path).await else {
        return http::build_404_response();
    };

    if !metadata.is_dir() {
        return serve_file(ctx, &path, &metadata, state).await;
    }

    // Relative links in a listing only work below a slash-terminated URL
    if !ctx.path.ends_with('/') {
        return http::build_moved_permanently(&format!("{}/", ctx.raw_path));
    }

    for index in INDEX_FILES {
        let index_path = path.join(index);
        if let Ok(meta) = fs::metadata(&index_path).await {
            if meta.is_file() {
                return serve_file(ctx, &index_path, &meta, state).await;
            }
        }
    }

    match render_listing(ctx.path, &path).await {
        Ok(html) => response::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to list '{}': {e}", path.display()));
            http::build_404_response()
        }
    }
}

/// Map a decoded URL path to an existing filesystem path under `root`
///
/// `.` and `..` segments are dropped before joining, and the canonical result
/// must still live under the canonical root, so symlinks cannot escape it.
/// Returns `None` when nothing exists there.
pub async fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Root directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    let relative: PathBuf = url_path
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect();

    // Not found is the common case, no need to log
    let resolved = fs::canonicalize(root_canonical.join(relative)).await.ok()?;
    if !resolved.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {url_path} -> {}",
            resolved.display()
        ));
        return None;
    }

    Some(resolved)
}

/// Stream a regular file with a guessed content type
///
/// Answers 304 when `If-Modified-Since` is not older than the file's mtime
/// truncated to whole seconds.
async fn serve_file(
    ctx: &RequestContext<'_>,
    path: &Path,
    metadata: &Metadata,
    state: &AppState,
) -> Response<ResponseBody> {
    let size = metadata.len();
    let modified: Option<DateTime<Utc>> = metadata.modified().ok().map(Into::into);
    let last_modified = modified.map(http_date);

    if let (Some(mtime), Some(since)) = (modified, ctx.if_modified_since.and_then(parse_http_date))
    {
        if mtime.timestamp() <= since.timestamp() {
            return response::build_304_response(last_modified.as_deref());
        }
    }

    let body = if ctx.is_head {
        response::empty_body()
    } else {
        match fs::File::open(path).await {
            Ok(file) => response::file_body(file, size, state.chunk_size()),
            Err(e) => {
                logger::log_error(&format!("Failed to open '{}': {e}", path.display()));
                return http::build_404_response();
            }
        }
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime::content_type_for(path))
        .header(CONTENT_LENGTH, size);

    if let Some(ref value) = last_modified {
        builder = builder.header(LAST_MODIFIED, value);
    }

    builder
        .body(body)
        .unwrap_or_else(|e| response::fallback("200", &e))
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
fn http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an IMF-fixdate header value; other date formats are ignored
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// HTML index of a directory sorted by name, directories marked with a trailing slash
async fn render_listing(url_path: &str, dir: &Path) -> std::io::Result<String> {
    let mut entries = Vec::new();
    let mut reader = fs::read_dir(dir).await?;
    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push((name, is_dir));
    }
    entries.sort_by_key(|(name, _)| name.to_lowercase());

    let title = format!("Directory listing for {}", escape_html(url_path));
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for (name, is_dir) in entries {
        let slash = if is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<li><a href=\"{}{slash}\">{}{slash}</a></li>\n",
            urlencoding::encode(&name),
            escape_html(&name),
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
