use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::Result;

/// Directory that rasterized images are written to, one uniquely named PNG per image.
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    directory: PathBuf,
}

impl ScreenshotStore {
    /// Opens the store, creating the directory (and its parents) if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `png` to `<directory>/<uuid>.png` and returns the path as a string.
    pub fn save_png(&self, png: &[u8]) -> Result<String> {
        let path = self.directory.join(format!("{}.png", Uuid::new_v4()));
        fs::write(&path, png)?;
        debug!("Wrote {} bytes to {}", png.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}
