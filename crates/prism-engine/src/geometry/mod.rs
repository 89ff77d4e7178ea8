//! Vertex layouts and geometry upload.

mod upload;
mod vertex;

pub use upload::{check_layout, upload_geometry, Geometry};
pub use vertex::{AttributeFormat, ColorVertex, NormalVertex, Vertex, VertexAttribute, VertexLayout};
