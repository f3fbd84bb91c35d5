//! Scanline-free software rasterizer that runs the surface shader stages.
//!
//! Triangles are displaced by the vertex stage, projected with the camera,
//! back-face culled, clipped by rejection against the near plane, and filled
//! with edge functions over their screen bounding box. Fragment attributes are
//! interpolated perspective-correctly and depth-tested against a float
//! z-buffer.

use glam::{Mat4, Vec2, Vec3, Vec4};
use image::{Rgba, Rgba32FImage};

use crate::camera::Camera;
use crate::geometry::SphereGeometry;
use crate::shader::{Fragment, SurfaceShader};

/// Opaque `#111827`.
pub const DEFAULT_BACKGROUND: [f32; 4] = [17.0 / 255.0, 24.0 / 255.0, 39.0 / 255.0, 1.0];

/// Color, depth and coverage buffers for one frame.
#[derive(Debug, Clone)]
pub struct RasterTarget {
    color: Rgba32FImage,
    depth: Vec<f32>,
    coverage: Vec<bool>,
}

impl RasterTarget {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let len = (width * height) as usize;
        Self {
            color: Rgba32FImage::new(width, height),
            depth: vec![f32::INFINITY; len],
            coverage: vec![false; len],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.color.dimensions()
    }

    pub fn clear(&mut self, background: [f32; 4]) {
        for pixel in self.color.pixels_mut() {
            *pixel = Rgba(background);
        }
        self.depth.fill(f32::INFINITY);
        self.coverage.fill(false);
    }

    pub fn color(&self) -> &Rgba32FImage {
        &self.color
    }

    /// Lets post effects run over the rasterized image in place.
    pub(crate) fn color_mut(&mut self) -> &mut Rgba32FImage {
        &mut self.color
    }

    /// Row-major flags, `true` where the surface was drawn.
    pub fn coverage(&self) -> &[bool] {
        &self.coverage
    }

    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        let (width, _) = self.dimensions();
        self.coverage
            .get((y * width + x) as usize)
            .copied()
            .unwrap_or(false)
    }

    pub fn covered_pixels(&self) -> usize {
        self.coverage.iter().filter(|&&covered| covered).count()
    }
}

/// Projected vertex ready for rasterization.
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    /// Pixel position.
    screen: Vec2,
    ndc: Vec3,
    inv_w: f32,
    uv_over_w: Vec2,
    noise_over_w: f32,
    /// Clip-space w is below the near plane.
    behind: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterStats {
    pub triangles: usize,
    pub culled: usize,
    pub clipped: usize,
    pub fragments: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Rasterizer {
    camera: Camera,
}

impl Rasterizer {
    /// Draws `geometry` through `shader` into `target`. The target is not
    /// cleared first.
    pub fn draw(
        &self,
        geometry: &SphereGeometry,
        shader: &SurfaceShader,
        target: &mut RasterTarget,
    ) -> RasterStats {
        let (width, height) = target.dimensions();
        let view_projection = self.camera.view_projection(width, height);
        let near = self.camera.near;
        let size = Vec2::new(width as f32, height as f32);

        let projected: Vec<ScreenVertex> = geometry
            .vertices()
            .iter()
            .map(|vertex| {
                let displaced = shader.displace(vertex);
                project(
                    &view_projection,
                    displaced.position,
                    vertex.uv,
                    displaced.noise_sample,
                    near,
                    size,
                )
            })
            .collect();

        let mut stats = RasterStats::default();
        for triangle in geometry.indices().chunks_exact(3) {
            stats.triangles += 1;
            let [a, b, c] = [0, 1, 2].map(|k| projected[triangle[k] as usize]);
            if a.behind || b.behind || c.behind {
                stats.clipped += 1;
                continue;
            }
            // Front faces are counter-clockwise in NDC.
            let ndc_area = (b.ndc.truncate() - a.ndc.truncate())
                .perp_dot(c.ndc.truncate() - a.ndc.truncate());
            if ndc_area <= 0.0 {
                stats.culled += 1;
                continue;
            }
            stats.fragments += fill_triangle(&a, &b, &c, shader, target);
        }
        stats
    }
}

fn project(
    view_projection: &Mat4,
    position: Vec3,
    uv: Vec2,
    noise_sample: f32,
    near: f32,
    size: Vec2,
) -> ScreenVertex {
    let clip: Vec4 = *view_projection * position.extend(1.0);
    let behind = clip.w < near;
    let inv_w = if behind { 0.0 } else { 1.0 / clip.w };
    let ndc = clip.truncate() * inv_w;
    let screen = Vec2::new(
        (ndc.x * 0.5 + 0.5) * size.x,
        (0.5 - ndc.y * 0.5) * size.y,
    );
    ScreenVertex {
        screen,
        ndc,
        inv_w,
        uv_over_w: uv * inv_w,
        noise_over_w: noise_sample * inv_w,
        behind,
    }
}

#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

fn fill_triangle(
    a: &ScreenVertex,
    b: &ScreenVertex,
    c: &ScreenVertex,
    shader: &SurfaceShader,
    target: &mut RasterTarget,
) -> usize {
    let area = edge(a.screen, b.screen, c.screen);
    if area == 0.0 {
        return 0;
    }
    let (width, height) = target.dimensions();
    let min = a.screen.min(b.screen).min(c.screen);
    let max = a.screen.max(b.screen).max(c.screen);
    let x_start = min.x.floor().max(0.0) as u32;
    let y_start = min.y.floor().max(0.0) as u32;
    let x_end = (max.x.ceil().max(0.0) as u32).min(width);
    let y_end = (max.y.ceil().max(0.0) as u32).min(height);

    let inv_area = 1.0 / area;
    let mut written = 0;
    for y in y_start..y_end {
        for x in x_start..x_end {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b.screen, c.screen, p) * inv_area;
            let w1 = edge(c.screen, a.screen, p) * inv_area;
            let w2 = edge(a.screen, b.screen, p) * inv_area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let index = (y * width + x) as usize;
            // z/w is affine in screen space.
            let depth = w0 * a.ndc.z + w1 * b.ndc.z + w2 * c.ndc.z;
            if depth >= target.depth[index] {
                continue;
            }

            let inv_w = w0 * a.inv_w + w1 * b.inv_w + w2 * c.inv_w;
            let uv = (a.uv_over_w * w0 + b.uv_over_w * w1 + c.uv_over_w * w2) / inv_w;
            let noise_sample =
                (a.noise_over_w * w0 + b.noise_over_w * w1 + c.noise_over_w * w2) / inv_w;
            let color = shader.shade(&Fragment { uv, noise_sample });

            target.depth[index] = depth;
            target.coverage[index] = true;
            target.color.put_pixel(x, y, Rgba(color.to_array()));
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizconfig::Color;

    fn shader(distortion: f32) -> SurfaceShader {
        let mut shader = SurfaceShader::new();
        let uniforms = shader.uniforms_mut();
        uniforms.distortion = distortion;
        uniforms.set_colors(Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 0.0, 1.0));
        shader
    }

    fn render(width: u32, height: u32, distortion: f32) -> (RasterTarget, RasterStats) {
        let geometry = SphereGeometry::new(1.0, 48, 24);
        let mut target = RasterTarget::new(width, height);
        target.clear(DEFAULT_BACKGROUND);
        let stats = Rasterizer::default().draw(&geometry, &shader(distortion), &mut target);
        (target, stats)
    }

    #[test]
    fn sphere_covers_the_center_but_not_the_corners() {
        let (target, _) = render(64, 48, 0.0);
        assert!(target.is_covered(32, 24));
        for (x, y) in [(0, 0), (63, 0), (0, 47), (63, 47)] {
            assert!(!target.is_covered(x, y));
            assert_eq!(target.color().get_pixel(x, y).0, DEFAULT_BACKGROUND);
        }
    }

    #[test]
    fn back_faces_are_culled() {
        // From 2.5 units away only the cap with z > 0.4 faces the camera.
        let (_, stats) = render(64, 64, 0.0);
        assert_eq!(stats.clipped, 0);
        let ratio = stats.culled as f32 / stats.triangles as f32;
        assert!((0.65..0.85).contains(&ratio), "culled ratio {ratio}");
    }

    #[test]
    fn covered_area_matches_projected_disc() {
        // Silhouette of a unit sphere seen from 2.5 units away.
        let (target, _) = render(200, 200, 0.0);
        let half_fov = 25f32.to_radians();
        let angular_radius = (1.0f32 / 2.5).asin();
        let radius_px = angular_radius.tan() / half_fov.tan() * 100.0;
        let expected = std::f32::consts::PI * radius_px * radius_px;
        let actual = target.covered_pixels() as f32;
        assert!(
            (actual - expected).abs() / expected < 0.05,
            "covered {actual}, expected about {expected}"
        );
    }

    #[test]
    fn surface_pixels_mix_red_and_blue() {
        let (target, _) = render(48, 48, 0.0);
        for (pixel, covered) in target.color().pixels().zip(target.coverage()) {
            if *covered {
                assert_eq!(pixel.0[1], 0.0);
                assert!((pixel.0[0] + pixel.0[2] - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn clear_resets_coverage() {
        let (mut target, _) = render(16, 16, 0.0);
        assert!(target.covered_pixels() > 0);
        target.clear(DEFAULT_BACKGROUND);
        assert_eq!(target.covered_pixels(), 0);
    }
}
