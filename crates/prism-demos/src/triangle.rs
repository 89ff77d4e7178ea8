use prism_engine::device::{Color, RasterState};
use prism_engine::frame::Scene;
use prism_engine::geometry::{ColorVertex, Geometry};
use prism_engine::lifecycle::Gfx;
use prism_engine::shader::{ShaderLibrary, ShaderProgram};
use prism_engine::Error;

use crate::shaders::{TRIANGLE_FRAG, TRIANGLE_VERT};

pub const TITLE: &str = "Prism Hello Triangle";
pub const WIDTH: u32 = 1366;
pub const HEIGHT: u32 = 768;

/// Red, green and blue corners in clip space.
pub fn vertices() -> [ColorVertex; 3] {
    [
        ColorVertex::new([-0.5, -0.5], Color::RED),
        ColorVertex::new([0.0, 0.5], Color::GREEN),
        ColorVertex::new([0.5, -0.5], Color::BLUE),
    ]
}

/// Static triangle; nothing changes between frames.
pub struct TriangleScene {
    program: ShaderProgram,
    geometry: Geometry,
}

impl TriangleScene {
    pub fn load(gfx: &mut Gfx<'_>, shaders: &ShaderLibrary) -> Result<Self, Error> {
        let program = gfx.load_program(shaders, TRIANGLE_VERT, TRIANGLE_FRAG)?;
        let geometry = gfx.upload_geometry(&program, &vertices(), None, RasterState::default())?;
        Ok(Self { program, geometry })
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl Scene for TriangleScene {
    fn draw(&mut self, gfx: &mut Gfx<'_>) -> Result<(), Error> {
        gfx.clear(Color::BLACK, false)?;
        gfx.draw(&self.geometry)
    }
}
