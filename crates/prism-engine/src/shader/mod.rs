//! Shader program building.
//!
//! WGSL stages are parsed and validated with `naga` before anything reaches
//! the device, so compile and link problems surface as typed errors with a
//! readable log instead of a device-side validation panic.

mod compile;
mod library;
mod link;
mod program;

pub use compile::{compile, CompiledShader, IoType, ScalarType, ShaderStage, StageUniform, StageVar};
pub use library::ShaderLibrary;
pub use link::{link, LinkedProgram, ProgramInterface, ProgramUniform, StageMask};
pub use program::{build_program, ShaderProgram};
