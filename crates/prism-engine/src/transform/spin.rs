use std::f32::consts::TAU;

use glam::Mat4;

/// Rotation about +Z that advances at a constant angular speed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spin {
    angle: f32,
    speed: f32,
}

impl Spin {
    /// `speed` in radians per second.
    pub fn new(speed: f32) -> Self {
        Self { angle: 0.0, speed }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Advances by `dt` seconds, keeping the angle in `[0, 2π)`.
    pub fn advance(&mut self, dt: f32) {
        let mut angle = (self.angle + dt * self.speed).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if angle >= TAU {
            angle = 0.0;
        }
        self.angle = angle;
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_z(self.angle)
    }
}
