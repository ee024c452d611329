//! Image listing module
//!
//! Enumerates the image directory and answers the listing endpoint with a
//! JSON array of file names.

use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::Path;
use tokio::fs;

/// Suffixes accepted as images, matched against the lower-cased name
pub const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// Check whether a file name carries a supported image extension
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// List image names among the immediate children of `image_dir`
///
/// Names keep the order the filesystem returns them in. Entries are matched
/// by name only, so a directory called `photo.png` is included. Names that are
/// not valid UTF-8 are skipped.
pub async fn list_images(image_dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = fs::read_dir(image_dir).await?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        match file_name.to_str() {
            Some(name) if is_image_name(name) => images.push(name.to_owned()),
            Some(_) => {}
            None => logger::log_warning(&format!(
                "Skipping non UTF-8 file name in {}: {}",
                image_dir.display(),
                file_name.to_string_lossy()
            )),
        }
    }

    Ok(images)
}

/// Serve the listing endpoint
///
/// Success is JSON with an allow-all CORS header; failure is a plain-text 500.
pub async fn serve_image_list(image_dir: &Path) -> Response<Full<Bytes>> {
    let images = match list_images(image_dir).await {
        Ok(images) => images,
        Err(e) => {
            let message = format!("Error listing images: {e}: '{}'", image_dir.display());
            logger::log_error(&message);
            return http::build_500_response(&message);
        }
    };

    match serde_json::to_string(&images) {
        Ok(json) => http::build_json_response(json),
        Err(e) => {
            let message = format!("Error listing images: {e}");
            logger::log_error(&message);
            http::build_500_response(&message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn test_is_image_name() {
        assert!(is_image_name("a.png"));
        assert!(is_image_name("b.JPG"));
        assert!(is_image_name("c.Jpeg"));
        assert!(is_image_name("party.gif"));
        assert!(is_image_name("x.webp"));
        assert!(!is_image_name("c.txt"));
        assert!(!is_image_name("notes.md"));
        assert!(!is_image_name("png"));
        assert!(!is_image_name("image.png.bak"));
        assert!(is_image_name(".png"));
    }

    #[tokio::test]
    async fn test_list_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.JPG", "c.txt", "notes.md"] {
            stdfs::write(dir.path().join(name), b"x").unwrap();
        }

        let images = list_images(dir.path()).await.unwrap();
        assert_eq!(sorted(images), vec!["a.png", "b.JPG"]);
    }

    #[tokio::test]
    async fn test_list_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("nested")).unwrap();
        stdfs::write(dir.path().join("nested").join("deep.png"), b"x").unwrap();
        stdfs::write(dir.path().join("top.gif"), b"x").unwrap();

        let images = list_images(dir.path()).await.unwrap();
        assert_eq!(images, vec!["top.gif"]);
    }

    #[tokio::test]
    async fn test_directory_named_like_image_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("album.png")).unwrap();

        let images = list_images(dir.path()).await.unwrap();
        assert_eq!(images, vec!["album.png"]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = list_images(&dir.path().join("images")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("ok.png"), b"x").unwrap();
        stdfs::write(dir.path().join(OsStr::from_bytes(b"\xffbad.png")), b"x").unwrap();

        let images = list_images(dir.path()).await.unwrap();
        assert_eq!(images, vec!["ok.png"]);
    }
}
