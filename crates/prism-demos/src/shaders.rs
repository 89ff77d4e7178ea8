use std::path::Path;

use prism_engine::shader::ShaderLibrary;

pub const TRIANGLE_VERT: &str = "triangle.vert.wgsl";
pub const TRIANGLE_FRAG: &str = "triangle.frag.wgsl";
pub const CUBE_VERT: &str = "cube.vert.wgsl";
pub const CUBE_FRAG: &str = "cube.frag.wgsl";

/// Bundled demo shaders, optionally shadowed by files in `dir`.
pub fn library(dir: Option<&Path>) -> ShaderLibrary {
    let library = ShaderLibrary::new()
        .with_bundled(TRIANGLE_VERT, include_str!("../shaders/triangle.vert.wgsl"))
        .with_bundled(TRIANGLE_FRAG, include_str!("../shaders/triangle.frag.wgsl"))
        .with_bundled(CUBE_VERT, include_str!("../shaders/cube.vert.wgsl"))
        .with_bundled(CUBE_FRAG, include_str!("../shaders/cube.frag.wgsl"));

    match dir {
        Some(dir) => library.with_dir(dir),
        None => library,
    }
}
