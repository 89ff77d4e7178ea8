use glam::{Mat4, Vec3};

/// Right-handed look-at camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
        }
    }

    /// World-to-view transform. Recomputed on every call.
    pub fn view_transform(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_lands_on_negative_z_axis() {
        let cam = Camera::new(Vec3::splat(5.0), Vec3::ZERO, Vec3::Z);
        let p = cam.view_transform().transform_point3(Vec3::ZERO);

        assert!(p.x.abs() < 1e-5);
        assert!(p.y.abs() < 1e-5);
        assert!((p.z + Vec3::splat(5.0).length()).abs() < 1e-4);
    }

    #[test]
    fn view_tracks_camera_moves() {
        let mut cam = Camera::new(Vec3::splat(5.0), Vec3::ZERO, Vec3::Z);
        let before = cam.view_transform();
        cam.position = Vec3::new(0.0, -5.0, 5.0);
        assert_ne!(before, cam.view_transform());
    }
}
