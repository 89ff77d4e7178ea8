use glam::{Mat4, Vec3};

use prism_engine::device::{Color, RasterState, UniformLocation};
use prism_engine::frame::Scene;
use prism_engine::geometry::{Geometry, NormalVertex};
use prism_engine::lifecycle::Gfx;
use prism_engine::shader::{ShaderLibrary, ShaderProgram};
use prism_engine::transform::{mat4_bytes, mvp, Camera, Perspective, Spin};
use prism_engine::Error;

use crate::shaders::{CUBE_FRAG, CUBE_VERT};

pub const TITLE: &str = "Prism Rotating Cube";
pub const WIDTH: u32 = 1366;
pub const HEIGHT: u32 = 768;

/// Radians per second about +Z.
pub const ANGULAR_SPEED: f32 = 0.5;

pub const FOV_Y_DEGREES: f32 = 60.0;
pub const Z_NEAR: f32 = 0.3;
pub const Z_FAR: f32 = 1000.0;

/// Name of the combined matrix uniform in the cube shader.
pub const MVP_UNIFORM: &str = "proj_view_model";

// Corners: T/B = top/bottom (z), F/B = front/back (y), L/R = x.
const TFL: [f32; 3] = [1.0, -1.0, 1.0];
const TBL: [f32; 3] = [1.0, 1.0, 1.0];
const TFR: [f32; 3] = [-1.0, -1.0, 1.0];
const TBR: [f32; 3] = [-1.0, 1.0, 1.0];
const BFL: [f32; 3] = [1.0, -1.0, -1.0];
const BBL: [f32; 3] = [1.0, 1.0, -1.0];
const BFR: [f32; 3] = [-1.0, -1.0, -1.0];
const BBR: [f32; 3] = [-1.0, 1.0, -1.0];

const FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
    ([TFL, TBL, TFR, TBR], [0.0, 0.0, 1.0]),
    ([BFL, BBL, BFR, BBR], [0.0, 0.0, -1.0]),
    ([TFL, TFR, BFL, BFR], [0.0, -1.0, 0.0]),
    ([TBL, TBR, BBL, BBR], [0.0, 1.0, 0.0]),
    ([TFL, BFL, TBL, BBL], [1.0, 0.0, 0.0]),
    ([TFR, BFR, TBR, BBR], [-1.0, 0.0, 0.0]),
];

/// 24 vertices: four per face so each face carries its own normal.
pub fn vertices() -> Vec<NormalVertex> {
    FACES
        .iter()
        .flat_map(|(corners, normal)| corners.iter().map(move |&c| NormalVertex::new(c, *normal)))
        .collect()
}

/// Two triangles per face, `b, b+1, b+2` and `b+1, b+2, b+3`.
pub fn indices() -> Vec<u32> {
    (0..FACES.len() as u32)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 1, b + 2, b + 3]
        })
        .collect()
}

pub fn camera() -> Camera {
    Camera::new(Vec3::splat(5.0), Vec3::ZERO, Vec3::Z)
}

pub fn projection(width: u32, height: u32) -> Mat4 {
    Perspective::for_size(FOV_Y_DEGREES.to_radians(), width, height, Z_NEAR, Z_FAR).matrix()
}

/// Depth-tested cube spinning about +Z.
pub struct CubeScene {
    program: ShaderProgram,
    geometry: Geometry,
    mvp_location: UniformLocation,
    camera: Camera,
    projection: Mat4,
    spin: Spin,
}

impl CubeScene {
    pub fn load(
        gfx: &mut Gfx<'_>,
        shaders: &ShaderLibrary,
        width: u32,
        height: u32,
    ) -> Result<Self, Error> {
        let program = gfx.load_program(shaders, CUBE_VERT, CUBE_FRAG)?;
        let mvp_location = program.uniform_location(MVP_UNIFORM).ok_or_else(|| {
            Error::ShaderLinkFailed(format!("cube program has no `{MVP_UNIFORM}` uniform"))
        })?;

        let indices = indices();
        let geometry = gfx.upload_geometry(
            &program,
            &vertices(),
            Some(indices.as_slice()),
            RasterState { depth_test: true },
        )?;

        Ok(Self {
            program,
            geometry,
            mvp_location,
            camera: camera(),
            projection: projection(width, height),
            spin: Spin::new(ANGULAR_SPEED),
        })
    }

    pub fn angle(&self) -> f32 {
        self.spin.angle()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn mvp(&self) -> Mat4 {
        mvp(self.projection, self.camera.view_transform(), self.spin.model())
    }
}

impl Scene for CubeScene {
    fn update(&mut self, dt: f32) {
        self.spin.advance(dt);
    }

    fn draw(&mut self, gfx: &mut Gfx<'_>) -> Result<(), Error> {
        gfx.clear(Color::BLACK, true)?;
        gfx.set_uniform(&self.program, self.mvp_location, &mat4_bytes(&self.mvp()))?;
        gfx.draw(&self.geometry)
    }
}
