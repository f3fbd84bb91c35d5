//! Renderer crate for Wobble, a noise-displaced sphere visualizer.
//!
//! The rendering core is plain CPU code that can be exercised without a
//! window. The overall flow of one tick is:
//!
//! ```text
//!   SettingsPublisher ──▶ SettingsReceiver::latest()
//!                                │ VisualizerSettings snapshot
//!                                ▼
//!   AnimationDriver::tick ──▶ SurfaceUniforms
//!                                │
//!   Rasterizer::draw (displace ─▶ project ─▶ shade, via noise3)
//!                                │ Rgba32FImage
//!   PostEffectChain (grain ─▶ chromatic aberration), in place
//!                                │ quantize, upscale to window size
//!                                │ RgbaImage
//!   FrameSink::submit ──▶ gpu::Presenter ──▶ window
//! ```
//!
//! [`FramePipeline`] runs that sequence and is what tests and offline callers
//! use directly. [`Renderer`] wraps it in a winit window, uploads every frame
//! to a wgpu texture and forwards key presses to an [`InputHandler`].

pub mod animation;
pub mod camera;
pub mod frame;
pub mod geometry;
mod gpu;
pub mod noise;
pub mod post;
pub mod raster;
pub mod runtime;
pub mod shader;
pub mod sink;
pub mod snapshot;
mod types;
mod window;

use anyhow::Result;
use tracing::info;

pub use animation::{advance, AnimationDriver, AnimationState};
pub use frame::FramePipeline;
pub use gpu::RenderError;
pub use noise::noise3;
pub use post::{PostEffect, PostEffectChain, MAX_ABERRATION_OFFSET};
pub use runtime::{FixedStepTimeSource, SystemTimeSource, TimeSource};
pub use shader::{SurfaceShader, SurfaceUniforms};
pub use sink::{CaptureError, FrameSink, DEFAULT_EXPORT_NAME};
pub use snapshot::{settings_channel, SettingsPublisher, SettingsReceiver};
pub use types::RendererConfig;
pub use vizconfig::{Color, VisualizerSettings};
pub use window::{InputHandler, Key, ModifiersState, NamedKey, WindowAction};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and renders until it is closed or `input` asks to quit.
    ///
    /// Must be called from the main thread. Settings are read from `settings`
    /// once per frame.
    pub fn run(self, mut settings: SettingsReceiver, mut input: Box<dyn InputHandler>) -> Result<()> {
        let session_seed = self.config.grain_seed.unwrap_or_else(rand::random);
        let mut pipeline = FramePipeline::from_config(&self.config, session_seed);

        info!(
            title = %self.config.title,
            export_dir = %self.config.export_dir.display(),
            "starting renderer"
        );
        window::run_window(&self.config, &mut pipeline, &mut settings, input.as_mut())
    }
}
