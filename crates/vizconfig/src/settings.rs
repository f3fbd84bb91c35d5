use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::color::Color;

pub const MOTION_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const DISTORTION_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const GRAIN_RANGE: RangeInclusive<f32> = 0.0..=0.5;
pub const CHROMATIC_ABERRATION_RANGE: RangeInclusive<f32> = 0.0..=0.05;

/// User-facing parameters for one frame of the visualizer.
///
/// The renderer treats a value of this type as an immutable snapshot: it is
/// read once at the start of a tick and never written back. Producers (the
/// settings file, keyboard shortcuts) are responsible for keeping the values in
/// sensible ranges, see [`VisualizerSettings::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    pub color_a: Color,
    pub color_b: Color,
    /// Speed multiplier applied to real elapsed time; 0 freezes the surface.
    pub motion: f32,
    /// Displacement magnitude along the vertex normal.
    pub distortion: f32,
    /// Opacity of the film grain overlay.
    pub grain: f32,
    /// Red/blue channel offset in normalized screen space.
    pub chromatic_aberration: f32,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            color_a: Color::from_rgb8(0xff, 0x00, 0x70),
            color_b: Color::from_rgb8(0x00, 0x7b, 0xff),
            motion: 0.2,
            distortion: 0.4,
            grain: 0.1,
            chromatic_aberration: 0.005,
        }
    }
}

impl VisualizerSettings {
    /// Returns a copy with every scalar clamped to the range exposed by the controls.
    pub fn clamped(self) -> Self {
        Self {
            motion: clamp_to(self.motion, &MOTION_RANGE),
            distortion: clamp_to(self.distortion, &DISTORTION_RANGE),
            grain: clamp_to(self.grain, &GRAIN_RANGE),
            chromatic_aberration: clamp_to(self.chromatic_aberration, &CHROMATIC_ABERRATION_RANGE),
            ..self
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}
