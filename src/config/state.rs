// Application state module
// Resolved paths and route table, built once at startup and shared by every request

use std::io;
use std::path::{Path, PathBuf};

use super::types::Config;
use crate::routing::RouteTable;

/// Name of the image directory placed beside the executable
pub const IMAGE_DIR_NAME: &str = "images";

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Base directory for static file requests
    pub served_root: PathBuf,
    /// Directory scanned by the listing endpoint
    pub image_dir: PathBuf,
    pub routes: RouteTable,
}

impl AppState {
    /// Build state from configuration, resolving the default image directory
    /// from the location of the running executable
    pub fn new(config: &Config) -> io::Result<Self> {
        let image_dir = match &config.paths.image_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_image_dir()?,
        };
        Ok(Self::with_dirs(
            config,
            PathBuf::from(&config.paths.served_root),
            image_dir,
        ))
    }

    pub fn with_dirs(config: &Config, served_root: PathBuf, image_dir: PathBuf) -> Self {
        Self {
            config: config.clone(),
            served_root,
            image_dir,
            routes: RouteTable::gallery(&config.paths.list_path),
        }
    }
}

fn default_image_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let base = exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok(base.join(IMAGE_DIR_NAME))
}
