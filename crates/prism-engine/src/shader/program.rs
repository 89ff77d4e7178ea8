use crate::device::{GraphicsDevice, ProgramId, Resource, UniformLocation};
use crate::lifecycle::ResourceSet;
use crate::Error;

use super::compile::{compile, ShaderStage};
use super::link::{link, ProgramInterface};

/// A linked program living on the device.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    id: ProgramId,
    interface: ProgramInterface,
}

impl ShaderProgram {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.interface.attribute_location(name)
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.interface.uniform_location(name)
    }
}

/// Compiles both stages, links them and creates the program on `device`.
///
/// Nothing reaches the device unless compile and link succeed, so a failure
/// never leaves a partial program behind.
pub fn build_program(
    device: &mut dyn GraphicsDevice,
    resources: &mut ResourceSet,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ShaderProgram, Error> {
    resources.ensure_open()?;

    let vertex = compile(ShaderStage::Vertex, vertex_source)?;
    let fragment = compile(ShaderStage::Fragment, fragment_source)?;
    let linked = link(vertex, fragment)?;

    let id = device.create_program(&linked)?;
    resources.track(Resource::Program(id));

    log::info!(
        "linked {id}: {} vertex inputs, {} uniforms",
        linked.interface().inputs().len(),
        linked.interface().uniforms().len()
    );

    Ok(ShaderProgram {
        id,
        interface: linked.interface().clone(),
    })
}
