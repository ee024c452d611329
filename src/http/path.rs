//! Request path translation module
//!
//! Maps a URL path onto a filesystem path below a root directory.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Result of translating a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    /// Filesystem path below the root
    pub fs_path: PathBuf,
    /// Whether the request path ended with `/`
    pub trailing_slash: bool,
}

/// Percent-decode a URL path; invalid UTF-8 is replaced lossily
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or_else(|_| {
        let bytes = urlencoding::decode_binary(raw.as_bytes());
        Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
    })
}

/// Translate a URL path (query already removed) to a path under `root`
///
/// The path is percent-decoded and normalized: empty and `.` segments are
/// dropped and `..` removes the previous segment, never climbing above `root`.
pub fn translate_path(root: &Path, request_path: &str) -> TranslatedPath {
    let decoded = decode_path(request_path);
    let trailing_slash = request_path.trim_end().ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            // a decoded backslash would be a separator on Windows
            s if s.contains('\\') => {}
            s => segments.push(s),
        }
    }

    let mut fs_path = root.to_path_buf();
    fs_path.extend(segments);

    TranslatedPath {
        fs_path,
        trailing_slash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let t = translate_path(Path::new("/srv"), "/images/a.png");
        assert_eq!(t.fs_path, PathBuf::from("/srv/images/a.png"));
        assert!(!t.trailing_slash);
    }

    #[test]
    fn test_root_and_trailing_slash() {
        let t = translate_path(Path::new("/srv"), "/");
        assert_eq!(t.fs_path, PathBuf::from("/srv"));
        assert!(t.trailing_slash);

        let t = translate_path(Path::new("/srv"), "/docs/");
        assert_eq!(t.fs_path, PathBuf::from("/srv/docs"));
        assert!(t.trailing_slash);
    }

    #[test]
    fn test_percent_decoding() {
        let t = translate_path(Path::new("/srv"), "/images/my%20photo.png");
        assert_eq!(t.fs_path, PathBuf::from("/srv/images/my photo.png"));
    }

    #[test]
    fn test_traversal_is_contained() {
        let t = translate_path(Path::new("/srv"), "/../../etc/passwd");
        assert_eq!(t.fs_path, PathBuf::from("/srv/etc/passwd"));

        let t = translate_path(Path::new("/srv"), "/a/../b");
        assert_eq!(t.fs_path, PathBuf::from("/srv/b"));

        let t = translate_path(Path::new("/srv"), "/%2e%2e/secret");
        assert_eq!(t.fs_path, PathBuf::from("/srv/secret"));

        let t = translate_path(Path::new("/srv"), "/./a//b");
        assert_eq!(t.fs_path, PathBuf::from("/srv/a/b"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert_eq!(decode_path("/a%FFb"), "/a\u{FFFD}b");
    }
}
