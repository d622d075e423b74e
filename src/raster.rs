//! Rendered map artifacts: cache-busted fetching, decoding and saving.

use crate::Result;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A downloadable poster produced by the service
#[derive(Debug, Clone, PartialEq)]
pub struct MapArtifact {
    pub map_url: String,
    /// Suggested name for the saved file
    pub filename: String,
}

impl MapArtifact {
    pub fn new(map_url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            map_url: map_url.into(),
            filename: filename.into(),
        }
    }
}

/// Milliseconds since the Unix epoch, used as the cache-busting stamp.
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Appends `param=stamp` to a URL. Map paths are stable across
/// regenerations, so every fetch needs a fresh stamp.
pub fn cache_busted_url(url: &str, param: &str, stamp: u128) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{param}={stamp}")
}

/// Writes a fetched artifact into `dir` and returns the full path.
pub fn save_artifact(bytes: &[u8], dir: impl AsRef<Path>, filename: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let name = Path::new(filename)
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "map.png".into());
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    log::info!("saved map artifact to {}", path.display());
    Ok(path)
}

/// A decoded map raster
#[cfg(feature = "render")]
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Unmultiplied RGBA8 pixels, row-major
    pub rgba: Vec<u8>,
}

#[cfg(feature = "render")]
impl RasterImage {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| crate::Error::Image(e.to_string()))?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Intrinsic size, the figure size at native resolution
    pub fn natural_size(&self) -> crate::core::geometry::DisplaySize {
        crate::core::geometry::DisplaySize::new(self.width as f64, self.height as f64)
    }
}
