use crate::device::DeviceError;
use crate::shader::ShaderStage;

/// Setup and frame errors surfaced by the engine.
///
/// Every variant except `Device` is raised during setup and is fatal: the
/// caller releases whatever was acquired and exits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize the windowing subsystem: {0}")]
    WindowInitFailed(String),

    #[error("failed to create the graphics context: {0}")]
    ContextCreationFailed(String),

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompileFailed { stage: ShaderStage, log: String },

    #[error("shader program failed to link:\n{0}")]
    ShaderLinkFailed(String),

    #[error("shader resource `{0}` not found")]
    ResourceNotFound(String),

    #[error("vertex layout does not match the program: {0}")]
    LayoutMismatch(String),

    #[error("geometry has no vertices")]
    EmptyGeometry,

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error(transparent)]
    Device(#[from] DeviceError),
}
