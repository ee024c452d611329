//! Static file serving module
//!
//! Resolves request paths below the served root and answers with file bytes,
//! an index file, a generated directory listing, a redirect or a 404.

use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::Metadata;
use std::path::Path;
use tokio::fs;

/// Files served in place of a directory listing, in order of preference
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

const FILE_NOT_FOUND: &str = "File not found";

/// Serve a request from `root`
pub async fn serve_static(ctx: &RequestContext<'_>, root: &Path) -> Response<Full<Bytes>> {
    let translated = http::translate_path(root, ctx.path);
    let path = translated.fs_path.as_path();

    // Missing files are routine, so no log line
    let Ok(metadata) = fs::metadata(path).await else {
        return http::build_404_response(FILE_NOT_FOUND);
    };

    if metadata.is_dir() {
        if !translated.trailing_slash {
            return http::build_redirect_response(&directory_location(ctx));
        }
        if let Some((index_path, index_meta)) = find_index_file(path).await {
            return serve_file(ctx, &index_path, &index_meta).await;
        }
        return listing::serve_listing(ctx.path, path).await;
    }

    if translated.trailing_slash {
        return http::build_404_response(FILE_NOT_FOUND);
    }

    serve_file(ctx, path, &metadata).await
}

/// Serve a single regular file with `Last-Modified` validation
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    path: &Path,
    metadata: &Metadata,
) -> Response<Full<Bytes>> {
    let last_modified = metadata.modified().ok();

    // If-None-Match takes precedence, and we issue no ETags
    if !ctx.has_if_none_match {
        if let Some(modified) = last_modified {
            if cache::is_not_modified(ctx.if_modified_since, modified) {
                return http::build_304_response(&cache::http_date(modified));
            }
        }
    }

    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return http::build_404_response(FILE_NOT_FOUND);
        }
    };

    let last_modified = last_modified.map(cache::http_date);
    http::build_file_response(
        content,
        mime::content_type_for(path),
        last_modified.as_deref(),
    )
}

async fn find_index_file(dir: &Path) -> Option<(std::path::PathBuf, Metadata)> {
    for name in INDEX_FILES {
        let candidate = dir.join(name);
        if let Ok(meta) = fs::metadata(&candidate).await {
            if meta.is_file() {
                return Some((candidate, meta));
            }
        }
    }
    None
}

/// Location for a directory requested without its trailing slash
fn directory_location(ctx: &RequestContext<'_>) -> String {
    match ctx.query {
        Some(query) => format!("{}/?{query}", ctx.path),
        None => format!("{}/", ctx.path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(path: &'a str, query: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            path,
            query,
            if_modified_since: None,
            has_if_none_match: false,
        }
    }

    #[test]
    fn test_directory_location() {
        assert_eq!(directory_location(&ctx("/docs", None)), "/docs/");
        assert_eq!(directory_location(&ctx("/docs", Some("a=1"))), "/docs/?a=1");
    }

    #[tokio::test]
    async fn test_index_file_preference() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.htm"), b"htm").unwrap();
        let (found, _) = find_index_file(dir.path()).await.unwrap();
        assert_eq!(found, dir.path().join("index.htm"));

        std::fs::write(dir.path().join("index.html"), b"html").unwrap();
        let (found, _) = find_index_file(dir.path()).await.unwrap();
        assert_eq!(found, dir.path().join("index.html"));
    }

    #[tokio::test]
    async fn test_index_directory_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("index.html")).unwrap();
        assert!(find_index_file(dir.path()).await.is_none());
    }
}
