//! Per-frame update step.
//!
//! The surface does not animate against wall-clock time. Each tick integrates
//! `motion * delta` into [`AnimationState::accumulated_time`], so dropping
//! motion to zero freezes the surface exactly where it is and raising it again
//! resumes from the same point.

use vizconfig::VisualizerSettings;

use crate::shader::SurfaceUniforms;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationState {
    /// Integral of `motion * delta` over all ticks so far.
    pub accumulated_time: f64,
    /// Number of completed ticks.
    pub frame_index: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Advances the state by one tick.
///
/// Negative or non-finite deltas count as zero. Negative motion is treated the
/// same way so time never runs backwards.
pub fn advance(previous: AnimationState, real_delta: f64, motion: f32) -> AnimationState {
    let delta = if real_delta.is_finite() {
        real_delta.max(0.0)
    } else {
        0.0
    };
    let motion = f64::from(motion).max(0.0);
    AnimationState {
        accumulated_time: previous.accumulated_time + delta * motion,
        frame_index: previous.frame_index.wrapping_add(1),
    }
}

/// Copies the time and the current settings into the uniform block.
pub fn apply_uniforms(
    state: &AnimationState,
    settings: &VisualizerSettings,
    uniforms: &mut SurfaceUniforms,
) {
    uniforms.elapsed_scaled_time = state.accumulated_time as f32;
    uniforms.distortion = settings.distortion;
    uniforms.set_colors(settings.color_a, settings.color_b);
}

/// Owns the running [`AnimationState`] between ticks.
#[derive(Debug, Clone, Default)]
pub struct AnimationDriver {
    state: AnimationState,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Runs one tick: advances time, then writes uniforms for this frame's draw.
    pub fn tick(
        &mut self,
        real_delta: f64,
        settings: &VisualizerSettings,
        uniforms: &mut SurfaceUniforms,
    ) -> AnimationState {
        self.state = advance(self.state, real_delta, settings.motion);
        apply_uniforms(&self.state, settings, uniforms);
        self.state
    }
}
