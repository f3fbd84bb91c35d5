//! Full-screen post effects over the rasterized surface.
//!
//! Effects run in a fixed order, grain first and chromatic aberration second,
//! each reading the previous stage's image. A chain is rebuilt from the
//! current settings every tick; building it is where parameters are clamped.
//! Effects rewrite the image in place. Aberration needs an unmodified copy of
//! its input, which it keeps in a caller-owned scratch image that is reused
//! across frames.

use glam::Vec2;
use image::Rgba32FImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vizconfig::VisualizerSettings;

/// Upper bound for the aberration offset, in normalized screen units.
pub const MAX_ABERRATION_OFFSET: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostEffect {
    /// Per-pixel random luminance screen-blended over the image.
    GrainOverlay { opacity: f32 },
    /// Red sampled at `uv + offset`, blue at `uv - offset`. Offsets follow the
    /// usual texture convention with `+y` pointing up.
    ChromaticAberration { offset: Vec2 },
}

impl PostEffect {
    pub fn name(&self) -> &'static str {
        match self {
            PostEffect::GrainOverlay { .. } => "grain",
            PostEffect::ChromaticAberration { .. } => "chromatic-aberration",
        }
    }

    /// Applies the effect to `image`. No-op parameters leave it untouched.
    pub fn apply(&self, image: &mut Rgba32FImage, scratch: &mut Rgba32FImage, seed: GrainSeed) {
        match *self {
            PostEffect::GrainOverlay { opacity } => apply_grain(image, opacity, seed),
            PostEffect::ChromaticAberration { offset } => apply_aberration(image, scratch, offset),
        }
    }
}

/// Seed material for one frame of grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrainSeed {
    pub session: u64,
    pub frame_index: u64,
}

impl GrainSeed {
    pub fn new(session: u64, frame_index: u64) -> Self {
        Self {
            session,
            frame_index,
        }
    }

    fn rng(self) -> StdRng {
        // splitmix64 finalizer so neighbouring frames land far apart.
        let mut z = self
            .session
            .wrapping_add(self.frame_index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        StdRng::seed_from_u64(z ^ (z >> 31))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostEffectChain {
    effects: Vec<PostEffect>,
}

impl PostEffectChain {
    /// Builds the standard grain then aberration chain, clamping both
    /// parameters. The aberration is applied along both axes.
    pub fn from_settings(settings: &VisualizerSettings) -> Self {
        let opacity = settings.grain.clamp(0.0, 1.0);
        let offset = settings.chromatic_aberration.clamp(0.0, MAX_ABERRATION_OFFSET);
        Self {
            effects: vec![
                PostEffect::GrainOverlay { opacity },
                PostEffect::ChromaticAberration {
                    offset: Vec2::splat(offset),
                },
            ],
        }
    }

    pub fn effects(&self) -> &[PostEffect] {
        &self.effects
    }

    pub fn apply(&self, image: &mut Rgba32FImage, scratch: &mut Rgba32FImage, seed: GrainSeed) {
        for effect in &self.effects {
            effect.apply(image, scratch, seed);
        }
    }
}

fn apply_grain(image: &mut Rgba32FImage, opacity: f32, seed: GrainSeed) {
    if opacity == 0.0 {
        return;
    }
    let mut rng = seed.rng();
    for pixel in image.pixels_mut() {
        let grain: f32 = rng.gen();
        for channel in &mut pixel.0[..3] {
            let c = *channel;
            let screen = 1.0 - (1.0 - c) * (1.0 - grain);
            *channel = c + (screen - c) * opacity;
        }
    }
}

fn apply_aberration(image: &mut Rgba32FImage, scratch: &mut Rgba32FImage, offset: Vec2) {
    if offset == Vec2::ZERO {
        return;
    }
    let (width, height) = image.dimensions();
    if scratch.dimensions() != (width, height) {
        *scratch = Rgba32FImage::new(width, height);
    }
    scratch.copy_from_slice(image.as_raw());

    // Pixel-space shift; screen +y is up so it maps to decreasing rows.
    let shift = Vec2::new(offset.x * width as f32, -offset.y * height as f32);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let center = Vec2::new(x as f32, y as f32);
        pixel.0[0] = sample_bilinear(scratch, center + shift, 0);
        pixel.0[2] = sample_bilinear(scratch, center - shift, 2);
    }
}

/// Bilinear read of one channel at pixel-center coordinates, clamped to the edge.
fn sample_bilinear(image: &Rgba32FImage, position: Vec2, channel: usize) -> f32 {
    let (width, height) = image.dimensions();
    let max = Vec2::new((width - 1) as f32, (height - 1) as f32);
    let p = position.clamp(Vec2::ZERO, max);
    let x0 = p.x.floor() as u32;
    let y0 = p.y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let tx = p.x - x0 as f32;
    let ty = p.y - y0 as f32;

    let at = |x: u32, y: u32| image.get_pixel(x, y).0[channel];
    let top = at(x0, y0) + (at(x1, y0) - at(x0, y0)) * tx;
    let bottom = at(x0, y1) + (at(x1, y1) - at(x0, y1)) * tx;
    top + (bottom - top) * ty
}
