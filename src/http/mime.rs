//! MIME type detection module
//!
//! Infers a Content-Type from a file name's extension, case-insensitively.

use std::path::Path;

/// Fallback for unknown or missing extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    // Text
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("xml", "text/xml"),
    // Scripts
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("wasm", "application/wasm"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/vnd.microsoft.icon"),
    ("bmp", "image/bmp"),
    ("avif", "image/avif"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/x-wav"),
    ("ogg", "audio/ogg"),
    ("m4a", "audio/mp4"),
    ("flac", "audio/flac"),
    // Video
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    // Documents and archives
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
];

/// Get MIME Content-Type for a file path
///
/// # Examples
/// ```ignore
/// assert_eq!(content_type_for(Path::new("photo.JPG")), "image/jpeg");
/// assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(lookup)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

fn lookup(extension: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("style.css")), "text/css");
        assert_eq!(content_type_for(Path::new("script.js")), "text/javascript");
        assert_eq!(content_type_for(Path::new("images/a.png")), "image/png");
        assert_eq!(content_type_for(Path::new("song.mp3")), "audio/mpeg");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(content_type_for(Path::new("b.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("c.WebP")), "image/webp");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for(Path::new("data.xyz")), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("README")), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new(".hidden")), DEFAULT_CONTENT_TYPE);
    }
}
