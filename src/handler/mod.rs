//! Request handler module
//!
//! Routes each request either to the image listing endpoint or to static
//! file serving below the served root.

pub mod images;
pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
