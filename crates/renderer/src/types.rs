use std::path::PathBuf;

use crate::raster::DEFAULT_BACKGROUND;

pub const DEFAULT_WINDOW_TITLE: &str = "Wobble";
pub const MIN_RENDER_SCALE: f32 = 0.25;
pub const MAX_RENDER_SCALE: f32 = 1.0;

/// Configuration passed to the renderer when constructing a window.
///
/// Describes how large the window should be, how much of it the software
/// rasterizer fills before upscaling, and where exported frames go.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Fraction of the window size the surface is rasterized at.
    pub render_scale: f32,
    /// Optional FPS cap; `None` renders as fast as presentation allows.
    pub target_fps: Option<f32>,
    pub vsync: bool,
    pub title: String,
    /// Clear color behind the surface.
    pub background: [f32; 4],
    /// Directory receiving exported PNGs.
    pub export_dir: PathBuf,
    /// Fixes the grain sequence; a random seed is drawn when `None`.
    pub grain_seed: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 800),
            render_scale: 0.5,
            target_fps: None,
            vsync: true,
            title: DEFAULT_WINDOW_TITLE.to_string(),
            background: DEFAULT_BACKGROUND,
            export_dir: PathBuf::from("."),
            grain_seed: None,
        }
    }
}

/// Keeps `scale` within the supported range; non-finite values render at
/// full size.
pub(crate) fn clamp_render_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE)
    } else {
        MAX_RENDER_SCALE
    }
}

/// Raster size for an output of `width` x `height` at `scale`. Never zero.
pub(crate) fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale = clamp_render_scale(scale);
    let scaled = |value: u32| ((value as f32 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_halves_the_window() {
        let config = RendererConfig::default();
        assert_eq!(scaled_size(1280, 800, config.render_scale), (640, 400));
        assert_eq!(scaled_size(1, 1, config.render_scale), (1, 1));
    }

    #[test]
    fn render_scale_is_clamped() {
        assert_eq!(scaled_size(300, 200, 4.0), (300, 200));
        assert_eq!(scaled_size(400, 200, 0.01), (100, 50));
        assert_eq!(clamp_render_scale(f32::NAN), MAX_RENDER_SCALE);
    }
}
