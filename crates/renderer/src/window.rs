use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::frame::FramePipeline;
use crate::gpu::{GpuContext, PresentOutcome, Presenter, RenderError};
use crate::runtime::{FramePacer, SystemTimeSource};
use crate::snapshot::SettingsReceiver;
use crate::types::RendererConfig;

/// Requests the application can make of the window in response to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    /// Write the most recently presented frame to the export directory.
    Export,
    Quit,
}

/// Receives key presses from the window.
///
/// Only initial presses are forwarded; auto-repeat is filtered out.
pub trait InputHandler {
    fn handle_key(&mut self, key: &Key, modifiers: ModifiersState) -> Option<WindowAction>;
}

/// Tracks frames per second for the periodic stats line.
struct FrameStats {
    frames: u32,
    since: Instant,
}

impl FrameStats {
    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            since: now,
        }
    }

    fn record(&mut self, pipeline: &FramePipeline, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.since);
        if elapsed >= Duration::from_secs(1) {
            let raster = pipeline.last_stats();
            debug!(
                fps = (self.frames as f32 / elapsed.as_secs_f32()).round(),
                frame = pipeline.animation().frame_index,
                time = pipeline.animation().accumulated_time,
                fragments = raster.fragments,
                culled = raster.culled,
                "render stats"
            );
            self.frames = 0;
            self.since = now;
        }
    }
}

/// Opens the window and drives the frame pipeline until it closes.
///
/// Returns an error wrapping [`RenderError::ContextLost`] when the GPU context
/// goes away so the caller can decide whether to start over.
pub(crate) fn run_window(
    config: &RendererConfig,
    pipeline: &mut FramePipeline,
    settings: &mut SettingsReceiver,
    input: &mut dyn InputHandler,
) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0.max(1), config.surface_size.1.max(1));
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;

    let mut gpu = GpuContext::new(&window, window.inner_size(), config.vsync)?;
    let mut presenter = Presenter::new(&gpu);

    let size = window.inner_size();
    pipeline.resize(size.width, size.height);
    let (render_width, render_height) = pipeline.render_size();
    info!(
        width = size.width,
        height = size.height,
        render_width,
        render_height,
        "window ready"
    );

    let mut time_source = SystemTimeSource::new();
    let mut pacer = FramePacer::new(config.target_fps);
    let mut stats = FrameStats::new(Instant::now());
    let mut modifiers = ModifiersState::empty();
    let mut fatal: Option<anyhow::Error> = None;

    window.request_redraw();

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::ModifiersChanged(new_modifiers) => {
                modifiers = new_modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match input.handle_key(&event.logical_key, modifiers) {
                    Some(WindowAction::Export) => {
                        if let Err(err) = pipeline.sink().export_to(&config.export_dir) {
                            warn!(error = %err, dir = %config.export_dir.display(), "export failed");
                        }
                    }
                    Some(WindowAction::Quit) => {
                        info!("quit requested");
                        elwt.exit();
                    }
                    None => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                pipeline.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                let snapshot = settings.latest();
                let frame = pipeline.render_with(&snapshot, &mut time_source);
                match presenter.present(&mut gpu, frame) {
                    Ok(PresentOutcome::Presented) => {}
                    Ok(PresentOutcome::Skipped) => {
                        debug!("frame skipped by surface");
                    }
                    Err(RenderError::ContextLost) => {
                        error!("GPU context lost; stopping render loop");
                        fatal = Some(anyhow::Error::new(RenderError::ContextLost));
                        elwt.exit();
                    }
                    Err(err) => {
                        warn!(error = %err, "surface error; retrying next frame");
                    }
                }
                let now = Instant::now();
                pacer.mark_rendered(now);
                stats.record(pipeline, now);
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if pacer.ready_for_frame(now) {
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = pacer.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    if let Some(err) = fatal {
        return Err(err);
    }
    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
