//! The noise-displaced surface material as two pure stage functions.
//!
//! `displace` is the vertex stage: it pushes each vertex along its normal by a
//! noise sample taken at `position + time`. `shade` is the fragment stage: it
//! samples the noise field a second time, at the tiled uv with the displacement
//! sample as depth, and blends the two surface colors with it. Feeding the
//! displacement sample into the color lookup keeps color patches attached to
//! the bumps they sit on.

use glam::{Vec2, Vec3, Vec4};
use vizconfig::Color;

use crate::geometry::Vertex;
use crate::noise::noise3;

/// Tiling applied to uv before the color noise lookup.
pub const COLOR_NOISE_TILING: f32 = 5.0;

/// Per-draw inputs shared by both stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceUniforms {
    /// Running integral of `motion * dt`.
    pub elapsed_scaled_time: f32,
    pub distortion: f32,
    pub color_a: Vec3,
    pub color_b: Vec3,
}

impl Default for SurfaceUniforms {
    fn default() -> Self {
        Self {
            elapsed_scaled_time: 0.0,
            distortion: 0.0,
            color_a: Vec3::ZERO,
            color_b: Vec3::ZERO,
        }
    }
}

impl SurfaceUniforms {
    pub fn set_colors(&mut self, color_a: Color, color_b: Color) {
        self.color_a = Vec3::from_array(color_a.to_array());
        self.color_b = Vec3::from_array(color_b.to_array());
    }
}

/// Vertex stage output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacedVertex {
    pub position: Vec3,
    /// Distortion-scaled displacement noise, forwarded to the fragment stage.
    pub noise_sample: f32,
}

/// Interpolated fragment stage input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub uv: Vec2,
    pub noise_sample: f32,
}

pub fn displace(vertex: &Vertex, uniforms: &SurfaceUniforms) -> DisplacedVertex {
    let noise_sample =
        noise3(vertex.position + uniforms.elapsed_scaled_time) * uniforms.distortion;
    DisplacedVertex {
        position: vertex.position + vertex.normal * noise_sample,
        noise_sample,
    }
}

/// Returns the fragment color as opaque RGBA.
pub fn shade(fragment: &Fragment, uniforms: &SurfaceUniforms) -> Vec4 {
    let lookup = (fragment.uv * COLOR_NOISE_TILING).extend(fragment.noise_sample);
    let color_noise = ((noise3(lookup) + 1.0) * 0.5).clamp(0.0, 1.0);
    uniforms
        .color_a
        .lerp(uniforms.color_b, color_noise)
        .extend(1.0)
}

/// Material instance owning the uniform block for one surface.
#[derive(Debug, Clone, Default)]
pub struct SurfaceShader {
    uniforms: SurfaceUniforms,
}

impl SurfaceShader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniforms(&self) -> &SurfaceUniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut SurfaceUniforms {
        &mut self.uniforms
    }

    pub fn displace(&self, vertex: &Vertex) -> DisplacedVertex {
        displace(vertex, &self.uniforms)
    }

    pub fn shade(&self, fragment: &Fragment) -> Vec4 {
        shade(fragment, &self.uniforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SphereGeometry;

    fn uniforms(time: f32, distortion: f32) -> SurfaceUniforms {
        let mut uniforms = SurfaceUniforms {
            elapsed_scaled_time: time,
            distortion,
            ..SurfaceUniforms::default()
        };
        uniforms.set_colors(Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 0.0, 1.0));
        uniforms
    }

    #[test]
    fn zero_distortion_leaves_every_vertex_in_place() {
        let sphere = SphereGeometry::new(1.0, 48, 24);
        let uniforms = uniforms(3.7, 0.0);
        for vertex in sphere.vertices() {
            let displaced = displace(vertex, &uniforms);
            assert_eq!(displaced.position, vertex.position);
            assert_eq!(displaced.noise_sample, 0.0);
        }
    }

    #[test]
    fn displacement_follows_the_normal() {
        let sphere = SphereGeometry::new(1.0, 32, 16);
        let uniforms = uniforms(0.25, 0.8);
        let mut moved = 0;
        for vertex in sphere.vertices() {
            let displaced = displace(vertex, &uniforms);
            let offset = displaced.position - vertex.position;
            let expected = vertex.normal * displaced.noise_sample;
            assert!((offset - expected).length() < 1e-5);
            if displaced.noise_sample.abs() > 1e-3 {
                moved += 1;
            }
        }
        assert!(moved > sphere.vertices().len() / 2);
    }

    #[test]
    fn displacement_scales_linearly_with_distortion() {
        let vertex = SphereGeometry::new(1.0, 16, 8).vertices()[40];
        let small = displace(&vertex, &uniforms(1.5, 0.5)).noise_sample;
        let large = displace(&vertex, &uniforms(1.5, 1.0)).noise_sample;
        assert!((large - small * 2.0).abs() < 1e-6);
    }

    #[test]
    fn flat_surface_still_varies_in_color() {
        let uniforms = uniforms(0.0, 0.0);
        let colors: Vec<Vec4> = (0..32)
            .map(|k| {
                let fragment = Fragment {
                    uv: Vec2::new(k as f32 / 31.0, 0.37),
                    noise_sample: 0.0,
                };
                shade(&fragment, &uniforms)
            })
            .collect();
        let reds: Vec<f32> = colors.iter().map(|c| c.x).collect();
        let spread = reds.iter().copied().fold(f32::NEG_INFINITY, f32::max)
            - reds.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(spread > 0.1, "color spread {spread}");
    }

    #[test]
    fn shaded_color_is_a_mix_of_the_two_inputs() {
        let uniforms = uniforms(0.0, 0.3);
        for k in 0..64 {
            let fragment = Fragment {
                uv: Vec2::new((k % 8) as f32 / 7.0, (k / 8) as f32 / 7.0),
                noise_sample: (k as f32 * 0.13).sin() * 0.3,
            };
            let color = shade(&fragment, &uniforms);
            assert_eq!(color.y, 0.0);
            assert_eq!(color.w, 1.0);
            assert!((color.x + color.z - 1.0).abs() < 1e-5);
            assert!((0.0..=1.0).contains(&color.x));
        }
    }
}
