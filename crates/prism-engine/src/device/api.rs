use std::fmt;

use crate::geometry::VertexLayout;
use crate::shader::LinkedProgram;

use super::debug::DebugMessage;

/// Handle to a linked program living on the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// Handle to a vertex or index buffer living on the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Handle to a vertex array: attribute layout bound to a program and buffers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexArrayId(pub(crate) u32);

/// Any device object that must be released exactly once.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Resource {
    Program(ProgramId),
    Buffer(BufferId),
    VertexArray(VertexArrayId),
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program #{}", self.0)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer #{}", self.0)
    }
}

impl fmt::Display for VertexArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex array #{}", self.0)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Program(id) => id.fmt(f),
            Resource::Buffer(id) => id.fmt(f),
            Resource::VertexArray(id) => id.fmt(f),
        }
    }
}

/// Linear RGBA color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Static buffer contents, written once at creation.
#[derive(Debug, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub contents: &'a [u8],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    pub fn size(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Fixed-function state baked into a vertex array.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RasterState {
    pub depth_test: bool,
}

/// Binds a vertex layout to a program and its source buffers.
#[derive(Debug, Clone)]
pub struct VertexArrayDesc<'a> {
    pub label: &'a str,
    pub program: ProgramId,
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<(BufferId, IndexFormat)>,
    pub layout: &'a VertexLayout,
    pub raster: RasterState,
}

/// Slot of a uniform inside a program (bind group 0).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation {
    pub binding: u32,
    pub size: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawMode {
    /// Non-indexed draw of `count` vertices starting at `first`.
    Arrays { first: u32, count: u32 },
    /// Indexed draw of `count` indices from the bound index buffer.
    Elements { count: u32 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub vertex_array: VertexArrayId,
    pub mode: DrawMode,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{0} does not exist or was already released")]
    InvalidHandle(Resource),

    #[error("uniform at binding {binding} expects {expected} bytes, got {actual}")]
    UniformSize {
        binding: u32,
        expected: u32,
        actual: usize,
    },

    #[error("{vertex_array} belongs to {expected}, not {actual}")]
    ProgramMismatch {
        vertex_array: VertexArrayId,
        expected: ProgramId,
        actual: ProgramId,
    },

    #[error("graphics API reported: {0}")]
    Debug(DebugMessage),

    #[error("surface was lost and cannot be recovered")]
    SurfaceLost,

    #[error("device resources were already torn down")]
    TornDown,

    #[error("{0}")]
    Backend(String),
}

/// Stateful command interface of the graphics device.
///
/// All calls happen on the thread that owns the window. Draw commands are
/// collected per frame and become visible on `present`.
pub trait GraphicsDevice {
    /// Short backend name for logs.
    fn backend_name(&self) -> &str;

    fn create_program(&mut self, program: &LinkedProgram) -> Result<ProgramId, DeviceError>;

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId, DeviceError>;

    fn create_vertex_array(
        &mut self,
        desc: &VertexArrayDesc<'_>,
    ) -> Result<VertexArrayId, DeviceError>;

    fn set_uniform(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
        bytes: &[u8],
    ) -> Result<(), DeviceError>;

    /// Clears the color target (and depth when `depth` is set) for the current frame.
    fn clear(&mut self, color: Color, depth: bool);

    fn draw(&mut self, call: &DrawCall) -> Result<(), DeviceError>;

    /// Submits the current frame and swaps it onto the window.
    fn present(&mut self) -> Result<(), DeviceError>;

    /// Destroys a device object. Releasing an unknown handle is an error.
    fn release(&mut self, resource: Resource) -> Result<(), DeviceError>;

    /// Messages reported by the API since the previous call.
    fn drain_debug_messages(&mut self) -> Vec<DebugMessage>;

    /// Drawable size changed (physical pixels).
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}
