//! Graphics device layer.
//!
//! This module is responsible for:
//! - the `GraphicsDevice` command interface used by everything above it
//! - the wgpu backend (`Gpu`): instance/adapter/device/queue + surface
//! - a headless `RecordingDevice` used by tests
//! - routing API debug messages (`DebugMode`)

mod api;
mod debug;
mod gpu;
mod init;
mod recording;
mod surface;

pub use api::{
    BufferDesc, BufferId, BufferKind, Color, DeviceError, DrawCall, DrawMode, GraphicsDevice,
    IndexFormat, ProgramId, RasterState, Resource, UniformLocation, VertexArrayDesc,
    VertexArrayId,
};
pub use debug::{report, DebugChannel, DebugMessage, DebugMode, DebugSeverity};
pub use gpu::Gpu;
pub use init::{parse_backends, GpuInit};
pub use recording::{Command, RecordedVertexArray, RecordingDevice};
