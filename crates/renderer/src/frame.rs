//! One tick of the visualizer, independent of any window or GPU.
//!
//! [`FramePipeline::render`] runs the whole per-frame sequence: advance the
//! animation with the settings snapshot, rasterize the displaced sphere, run
//! the post chain, quantize to 8-bit and hand the result to the frame sink.
//! The raster may run below the output size (`render_scale`); the quantized
//! frame is then upscaled with a triangle filter so the sink, and with it
//! every capture and export, always holds a frame at the output size. The
//! presentation adapter only uploads what this produces.

use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage, RgbaImage};
use vizconfig::VisualizerSettings;

use crate::animation::{AnimationDriver, AnimationState};
use crate::geometry::SphereGeometry;
use crate::post::{GrainSeed, PostEffectChain};
use crate::raster::{RasterStats, RasterTarget, Rasterizer, DEFAULT_BACKGROUND};
use crate::runtime::TimeSource;
use crate::shader::{SurfaceShader, SurfaceUniforms};
use crate::sink::{CaptureError, FrameSink};
use crate::types::{clamp_render_scale, scaled_size, RendererConfig, MAX_RENDER_SCALE};

#[derive(Debug)]
pub struct FramePipeline {
    geometry: SphereGeometry,
    shader: SurfaceShader,
    driver: AnimationDriver,
    rasterizer: Rasterizer,
    target: RasterTarget,
    /// Aberration input copy, kept between frames.
    scratch: Rgba32FImage,
    sink: FrameSink,
    background: [f32; 4],
    output_size: (u32, u32),
    render_scale: f32,
    session_seed: u64,
    last_stats: RasterStats,
}

impl FramePipeline {
    /// Pipeline that rasterizes directly at `width` x `height`.
    pub fn new(width: u32, height: u32, session_seed: u64) -> Self {
        let output_size = (width.max(1), height.max(1));
        Self {
            geometry: SphereGeometry::default(),
            shader: SurfaceShader::new(),
            driver: AnimationDriver::new(),
            rasterizer: Rasterizer::default(),
            target: RasterTarget::new(output_size.0, output_size.1),
            scratch: Rgba32FImage::new(0, 0),
            sink: FrameSink::new(),
            background: DEFAULT_BACKGROUND,
            output_size,
            render_scale: MAX_RENDER_SCALE,
            session_seed,
            last_stats: RasterStats::default(),
        }
    }

    /// Pipeline whose output matches the configured window surface.
    pub fn from_config(config: &RendererConfig, session_seed: u64) -> Self {
        let (width, height) = config.surface_size;
        Self::new(width, height, session_seed)
            .with_render_scale(config.render_scale)
            .with_background(config.background)
    }

    pub fn with_geometry(mut self, geometry: SphereGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_background(mut self, background: [f32; 4]) -> Self {
        self.background = background;
        self
    }

    /// Rasterizes at `scale` of the output size, clamped to 0.25..=1.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = clamp_render_scale(scale);
        let (width, height) = self.output_size;
        self.resize(width, height);
        self
    }

    /// Size of the frames handed to the sink.
    pub fn size(&self) -> (u32, u32) {
        self.output_size
    }

    /// Size the surface is rasterized at.
    pub fn render_size(&self) -> (u32, u32) {
        self.target.dimensions()
    }

    /// Changes the output size. Takes effect on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.output_size = (width.max(1), height.max(1));
        let (render_width, render_height) =
            scaled_size(self.output_size.0, self.output_size.1, self.render_scale);
        if (render_width, render_height) != self.render_size() {
            self.target = RasterTarget::new(render_width, render_height);
        }
    }

    /// Renders one frame and returns the composited image, which is also the
    /// frame the sink now holds.
    pub fn render(&mut self, settings: &VisualizerSettings, real_delta: f64) -> &RgbaImage {
        let state = self
            .driver
            .tick(real_delta, settings, self.shader.uniforms_mut());

        self.target.clear(self.background);
        self.last_stats = self
            .rasterizer
            .draw(&self.geometry, &self.shader, &mut self.target);

        let chain = PostEffectChain::from_settings(settings);
        let seed = GrainSeed::new(self.session_seed, state.frame_index);
        chain.apply(self.target.color_mut(), &mut self.scratch, seed);

        let mut frame = quantize(self.target.color());
        let (width, height) = self.output_size;
        if frame.dimensions() != self.output_size {
            frame = imageops::resize(&frame, width, height, FilterType::Triangle);
        }
        self.sink.submit(frame, state.frame_index)
    }

    /// Renders one frame with the delta reported by `time`.
    pub fn render_with(
        &mut self,
        settings: &VisualizerSettings,
        time: &mut dyn TimeSource,
    ) -> &RgbaImage {
        let delta = time.next_delta();
        self.render(settings, delta)
    }

    pub fn latest(&self) -> Option<&RgbaImage> {
        self.sink.latest()
    }

    pub fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        self.sink.capture()
    }

    pub fn sink(&self) -> &FrameSink {
        &self.sink
    }

    /// Coverage of the surface in the last rasterized frame, at render size.
    pub fn coverage(&self) -> &[bool] {
        self.target.coverage()
    }

    pub fn uniforms(&self) -> &SurfaceUniforms {
        self.shader.uniforms()
    }

    pub fn animation(&self) -> AnimationState {
        self.driver.state()
    }

    pub fn last_stats(&self) -> RasterStats {
        self.last_stats
    }
}

/// Converts linear-use floats to 8-bit with `round(clamp(c, 0, 1) * 255)`.
pub fn quantize(image: &Rgba32FImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let source = image.get_pixel(x, y).0;
        Rgba(source.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_and_clamps() {
        let image = Rgba32FImage::from_pixel(1, 1, Rgba([0.5, -1.0, 2.0, 1.0]));
        assert_eq!(quantize(&image).get_pixel(0, 0), &Rgba([128, 0, 255, 255]));
    }

    #[test]
    fn sink_is_empty_until_first_render() {
        let mut pipeline =
            FramePipeline::new(24, 16, 1).with_geometry(SphereGeometry::new(1.0, 16, 8));
        assert!(matches!(
            pipeline.capture(),
            Err(CaptureError::NoFrameAvailable)
        ));
        pipeline.render(&VisualizerSettings::default(), 0.0);
        assert!(pipeline.capture().is_ok());
        assert_eq!(pipeline.sink().frame_index(), Some(1));
    }

    #[test]
    fn resize_changes_output_dimensions() {
        let mut pipeline =
            FramePipeline::new(24, 16, 1).with_geometry(SphereGeometry::new(1.0, 16, 8));
        pipeline.resize(40, 30);
        let frame = pipeline.render(&VisualizerSettings::default(), 0.016);
        assert_eq!(frame.dimensions(), (40, 30));
    }

    #[test]
    fn animation_time_follows_motion() {
        let settings = VisualizerSettings {
            motion: 0.5,
            ..VisualizerSettings::default()
        };
        let mut pipeline =
            FramePipeline::new(16, 16, 1).with_geometry(SphereGeometry::new(1.0, 12, 6));
        pipeline.render(&settings, 1.0);
        pipeline.render(&settings, 1.0);
        assert_eq!(pipeline.animation().accumulated_time, 1.0);
        assert_eq!(pipeline.uniforms().elapsed_scaled_time, 1.0);
    }

    #[test]
    fn scaled_render_is_upscaled_to_output_size() {
        let mut pipeline = FramePipeline::new(64, 40, 1)
            .with_geometry(SphereGeometry::new(1.0, 16, 8))
            .with_render_scale(0.5);
        assert_eq!(pipeline.render_size(), (32, 20));
        let frame = pipeline.render(&VisualizerSettings::default(), 0.0);
        assert_eq!(frame.dimensions(), (64, 40));

        pipeline.resize(100, 60);
        assert_eq!(pipeline.size(), (100, 60));
        assert_eq!(pipeline.render_size(), (50, 30));
    }
}
