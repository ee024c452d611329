//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! listing and static-serving logic in `handler`.

pub mod cache;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use path::translate_path;
pub use response::{
    build_304_response, build_404_response, build_500_response, build_501_response,
    build_file_response, build_html_response, build_json_response, build_redirect_response,
};
