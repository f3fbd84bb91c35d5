use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tracing::info;

/// File name used for exported frames.
pub const DEFAULT_EXPORT_NAME: &str = "abstract-visualizer.png";

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no frame has been rendered yet")]
    NoFrameAvailable,
    #[error("failed to encode frame as PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Holds the most recently completed composited frame.
///
/// The frame pipeline submits every frame here before it is presented, so a
/// capture always reflects exactly what is on screen.
#[derive(Debug, Default)]
pub struct FrameSink {
    latest: Option<RgbaImage>,
    frame_index: Option<u64>,
}

impl FrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held frame and returns it.
    pub fn submit(&mut self, image: RgbaImage, frame_index: u64) -> &RgbaImage {
        self.frame_index = Some(frame_index);
        self.latest.insert(image)
    }

    pub fn latest(&self) -> Option<&RgbaImage> {
        self.latest.as_ref()
    }

    /// Tick that produced [`FrameSink::latest`].
    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    /// Encodes the latest frame as PNG.
    pub fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        let image = self.latest.as_ref().ok_or(CaptureError::NoFrameAvailable)?;
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Writes the latest frame to `dir/abstract-visualizer.png`, creating
    /// `dir` if needed, and returns the written path.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, CaptureError> {
        let bytes = self.capture()?;
        fs::create_dir_all(dir).map_err(|source| CaptureError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(DEFAULT_EXPORT_NAME);
        fs::write(&path, bytes).map_err(|source| CaptureError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), frame = ?self.frame_index, "exported frame");
        Ok(path)
    }
}
