use std::f32::consts::PI;

use glam::{Vec2, Vec3};

pub const DEFAULT_SPHERE_RADIUS: f32 = 1.0;
pub const DEFAULT_SPHERE_SEGMENTS: u32 = 128;

/// Per-vertex attributes of the base surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Fixed-topology UV sphere.
///
/// Vertices are laid out row by row from the north pole (`v = 0`) to the south
/// pole, with a duplicated seam column so `uv.x` runs cleanly from 0 to 1.
/// Triangles that would collapse at the poles are omitted. Winding is
/// counter-clockwise when viewed from outside.
#[derive(Debug, Clone)]
pub struct SphereGeometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let columns = width_segments + 1;

        let mut vertices = Vec::with_capacity((columns * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();
                let normal = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
                vertices.push(Vertex {
                    position: normal * radius,
                    normal,
                    uv: Vec2::new(u, 1.0 - v),
                });
            }
        }

        let mut indices = Vec::with_capacity((width_segments * (height_segments - 1) * 6) as usize);
        let index = |ix: u32, iy: u32| iy * columns + ix;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = index(ix + 1, iy);
                let b = index(ix, iy);
                let c = index(ix, iy + 1);
                let d = index(ix + 1, iy + 1);
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPHERE_RADIUS,
            DEFAULT_SPHERE_SEGMENTS,
            DEFAULT_SPHERE_SEGMENTS,
        )
    }
}
