//! Presentation adapter: uploads composited frames and draws them to the window.
//!
//! Nothing in here knows about noise, sphere geometry or post effects. The
//! frame pipeline hands over an 8-bit RGBA image; this module owns the wgpu
//! plumbing needed to get it on screen:
//! - `context` owns instance/adapter/device/surface wiring, reconfigures the
//!   swapchain on resize, and watches for device loss.
//! - `present` keeps the frame texture and a full-screen triangle pipeline
//!   that samples it with a linear filter.

mod context;
mod present;

pub(crate) use context::GpuContext;
pub(crate) use present::{PresentOutcome, Presenter};

/// Failures while putting a frame on screen.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    /// The device or surface can no longer be used; the caller must rebuild
    /// the renderer.
    #[error("GPU context lost")]
    ContextLost,
}
