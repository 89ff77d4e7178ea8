use glam::Mat4;

/// Perspective projection with `[0, 1]` clip depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Perspective {
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        debug_assert!(aspect > 0.0 && near > 0.0 && far > near);
        Self {
            fov_y,
            aspect,
            near,
            far,
        }
    }

    /// Aspect from a drawable size. A zero height falls back to 1.
    pub fn for_size(fov_y: f32, width: u32, height: u32, near: f32, far: f32) -> Self {
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        Self::new(fov_y, aspect, near, far)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}
