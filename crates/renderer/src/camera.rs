use glam::{Mat4, Vec3};

pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.0, 2.5);
pub const DEFAULT_FOV_Y_DEGREES: f32 = 50.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Perspective camera looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: DEFAULT_EYE,
            target: Vec3::ZERO,
            fov_y_degrees: DEFAULT_FOV_Y_DEGREES,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// GL-style projection: clip-space depth in `[-w, w]`.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        self.projection(aspect) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_screen_center() {
        let clip = Camera::default().view_projection(800, 600) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!((clip.w - 2.5).abs() < 1e-5);
    }

    #[test]
    fn unit_sphere_fits_in_frame() {
        let view_projection = Camera::default().view_projection(1280, 800);
        let top = view_projection * Vec3::Y.extend(1.0);
        let ndc_y = top.y / top.w;
        assert!(ndc_y > 0.3 && ndc_y < 1.0, "top at {ndc_y}");
    }
}
