use crate::device::UniformLocation;
use crate::Error;

use super::compile::{CompiledShader, ShaderStage, StageVar};

/// Set of stages that reference a uniform.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct StageMask {
    vertex: bool,
    fragment: bool,
}

impl StageMask {
    pub fn contains(self, stage: ShaderStage) -> bool {
        match stage {
            ShaderStage::Vertex => self.vertex,
            ShaderStage::Fragment => self.fragment,
        }
    }

    fn insert(&mut self, stage: ShaderStage) {
        match stage {
            ShaderStage::Vertex => self.vertex = true,
            ShaderStage::Fragment => self.fragment = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramUniform {
    pub name: String,
    pub binding: u32,
    pub size: u32,
    pub ty: String,
    pub stages: StageMask,
}

impl ProgramUniform {
    pub fn location(&self) -> UniformLocation {
        UniformLocation {
            binding: self.binding,
            size: self.size,
        }
    }
}

/// What a linked program exposes to the host: vertex inputs and uniforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramInterface {
    inputs: Vec<StageVar>,
    uniforms: Vec<ProgramUniform>,
}

impl ProgramInterface {
    /// Vertex-stage inputs, each of which needs a matching vertex attribute.
    pub fn inputs(&self) -> &[StageVar] {
        &self.inputs
    }

    pub fn uniforms(&self) -> &[ProgramUniform] {
        &self.uniforms
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.inputs.iter().find(|v| v.name == name).map(|v| v.location)
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .find(|u| u.name == name)
            .map(ProgramUniform::location)
    }
}

/// A vertex and fragment stage known to work together.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    vertex: CompiledShader,
    fragment: CompiledShader,
    interface: ProgramInterface,
}

impl LinkedProgram {
    pub fn vertex(&self) -> &CompiledShader {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledShader {
        &self.fragment
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }
}

/// Checks that two compiled stages form a program.
///
/// Every problem found is written to the link log; any problem fails the link.
pub fn link(vertex: CompiledShader, fragment: CompiledShader) -> Result<LinkedProgram, Error> {
    let mut problems = Vec::new();

    if vertex.stage() != ShaderStage::Vertex {
        problems.push(format!("first stage is a {} shader", vertex.stage()));
    }
    if fragment.stage() != ShaderStage::Fragment {
        problems.push(format!("second stage is a {} shader", fragment.stage()));
    }

    for input in fragment.inputs() {
        match vertex.outputs().iter().find(|o| o.location == input.location) {
            None => problems.push(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )),
            Some(output) if output.ty != input.ty => problems.push(format!(
                "location {}: vertex writes {}, fragment reads {}",
                input.location, output.ty, input.ty
            )),
            Some(_) => {}
        }
    }

    let mut uniforms: Vec<ProgramUniform> = Vec::new();
    for shader in [&vertex, &fragment] {
        for u in shader.uniforms() {
            if u.group != 0 {
                problems.push(format!(
                    "uniform `{}` uses bind group {}; only group 0 is supported",
                    u.name, u.group
                ));
                continue;
            }

            if let Some(existing) = uniforms.iter_mut().find(|e| e.binding == u.binding) {
                if existing.name != u.name || existing.ty != u.ty {
                    problems.push(format!(
                        "binding {}: `{}: {}` in one stage, `{}: {}` in the {} stage",
                        u.binding,
                        existing.name,
                        existing.ty,
                        u.name,
                        u.ty,
                        shader.stage()
                    ));
                } else {
                    existing.stages.insert(shader.stage());
                }
                continue;
            }

            if uniforms.iter().any(|e| e.name == u.name) {
                problems.push(format!(
                    "uniform `{}` is declared at more than one binding",
                    u.name
                ));
                continue;
            }

            let mut stages = StageMask::default();
            stages.insert(shader.stage());
            uniforms.push(ProgramUniform {
                name: u.name.clone(),
                binding: u.binding,
                size: u.size,
                ty: u.ty.clone(),
                stages,
            });
        }
    }

    if !problems.is_empty() {
        return Err(Error::ShaderLinkFailed(problems.join("\n")));
    }

    uniforms.sort_by_key(|u| u.binding);

    let interface = ProgramInterface {
        inputs: vertex.inputs().to_vec(),
        uniforms,
    };

    Ok(LinkedProgram {
        vertex,
        fragment,
        interface,
    })
}
