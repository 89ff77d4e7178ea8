//! Model/view/projection math.
//!
//! Column vectors throughout: a point is transformed as `projection * view *
//! model * p`, so the combined matrix is composed right to left.

mod camera;
mod projection;
mod spin;

pub use camera::Camera;
pub use projection::Perspective;
pub use spin::Spin;

use glam::Mat4;

/// Combined model-view-projection matrix.
pub fn mvp(projection: Mat4, view: Mat4, model: Mat4) -> Mat4 {
    projection * view * model
}

/// Column-major bytes as a `mat4x4<f32>` uniform expects them.
pub fn mat4_bytes(m: &Mat4) -> [u8; 64] {
    bytemuck::cast(m.to_cols_array())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn composition_applies_model_first() {
        let model = Mat4::from_translation(Vec3::X);
        let view = Mat4::from_scale(Vec3::splat(2.0));
        let projection = Mat4::IDENTITY;

        let p = mvp(projection, view, model).transform_point3(Vec3::ZERO);
        // translate then scale: (1,0,0) * 2
        assert!(p.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn bytes_are_column_major() {
        let m = Mat4::from_translation(Vec3::new(7.0, 8.0, 9.0));
        let bytes = mat4_bytes(&m);
        let floats: [f32; 16] = bytemuck::cast(bytes);
        // translation lives in the fourth column
        assert_eq!(&floats[12..15], &[7.0, 8.0, 9.0]);
    }
}
