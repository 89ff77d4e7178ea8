use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::device::Color;
use crate::shader::{IoType, ScalarType};
use crate::Error;

/// Per-attribute storage format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
    Uint32,
    Sint32,
    /// Four bytes normalized to `[0, 1]` floats.
    Unorm8x4,
}

impl AttributeFormat {
    pub fn component_count(self) -> u8 {
        match self {
            AttributeFormat::Float32 | AttributeFormat::Uint32 | AttributeFormat::Sint32 => 1,
            AttributeFormat::Float32x2 => 2,
            AttributeFormat::Float32x3 => 3,
            AttributeFormat::Float32x4 | AttributeFormat::Unorm8x4 => 4,
        }
    }

    /// Size in bytes.
    pub fn size(self) -> u64 {
        match self {
            AttributeFormat::Unorm8x4 => 4,
            other => 4 * other.component_count() as u64,
        }
    }

    pub fn normalized(self) -> bool {
        matches!(self, AttributeFormat::Unorm8x4)
    }

    /// Type the shader observes for this attribute.
    pub fn io_type(self) -> IoType {
        let scalar = match self {
            AttributeFormat::Uint32 => ScalarType::Uint,
            AttributeFormat::Sint32 => ScalarType::Sint,
            _ => ScalarType::Float,
        };
        IoType::new(scalar, self.component_count())
    }

    pub(crate) fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            AttributeFormat::Float32 => wgpu::VertexFormat::Float32,
            AttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            AttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
            AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
            AttributeFormat::Uint32 => wgpu::VertexFormat::Uint32,
            AttributeFormat::Sint32 => wgpu::VertexFormat::Sint32,
            AttributeFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u64,
}

/// How one interleaved vertex is laid out in its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    stride: u64,
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u64) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    pub fn with(mut self, location: u32, format: AttributeFormat, offset: u64) -> Self {
        self.attributes.push(VertexAttribute {
            location,
            format,
            offset,
        });
        self
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// Rejects duplicate locations and attributes that overlap or overrun the stride.
    pub fn validate(&self) -> Result<(), Error> {
        if self.stride == 0 {
            return Err(Error::LayoutMismatch("vertex stride is zero".into()));
        }

        for (i, a) in self.attributes.iter().enumerate() {
            let end = a.offset + a.format.size();
            if end > self.stride {
                return Err(Error::LayoutMismatch(format!(
                    "attribute at location {} ends at byte {end}, past stride {}",
                    a.location, self.stride
                )));
            }

            for b in &self.attributes[i + 1..] {
                if a.location == b.location {
                    return Err(Error::LayoutMismatch(format!(
                        "location {} is declared twice",
                        a.location
                    )));
                }
                let b_end = b.offset + b.format.size();
                if a.offset < b_end && b.offset < end {
                    return Err(Error::LayoutMismatch(format!(
                        "attributes at locations {} and {} overlap",
                        a.location, b.location
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A plain-old-data vertex record with a fixed attribute layout.
pub trait Vertex: Pod {
    fn layout() -> VertexLayout;
}

/// 2D position + RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ColorVertex {
    pub fn new(position: [f32; 2], color: Color) -> Self {
        Self {
            position,
            color: color.to_array(),
        }
    }
}

impl Vertex for ColorVertex {
    fn layout() -> VertexLayout {
        VertexLayout::new(size_of::<Self>() as u64)
            .with(0, AttributeFormat::Float32x2, offset_of!(ColorVertex, position) as u64)
            .with(1, AttributeFormat::Float32x4, offset_of!(ColorVertex, color) as u64)
    }
}

/// 3D position + normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct NormalVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl NormalVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

impl Vertex for NormalVertex {
    fn layout() -> VertexLayout {
        VertexLayout::new(size_of::<Self>() as u64)
            .with(0, AttributeFormat::Float32x3, offset_of!(NormalVertex, position) as u64)
            .with(1, AttributeFormat::Float32x3, offset_of!(NormalVertex, normal) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── builtin vertex types ──────────────────────────────────────────────

    #[test]
    fn color_vertex_layout() {
        let layout = ColorVertex::layout();
        assert_eq!(layout.stride(), 24);
        assert_eq!(layout.attribute(0).map(|a| a.offset), Some(0));
        assert_eq!(layout.attribute(1).map(|a| a.offset), Some(8));
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn normal_vertex_layout() {
        let layout = NormalVertex::layout();
        assert_eq!(layout.stride(), 24);
        assert_eq!(layout.attribute(1).map(|a| a.offset), Some(12));
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn bytes_follow_field_order() {
        let v = ColorVertex::new([1.0, 2.0], Color::BLUE);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(floats, &[1.0, 2.0, 0.0, 0.0, 1.0, 1.0]);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn overrun_is_rejected() {
        let layout = VertexLayout::new(12).with(0, AttributeFormat::Float32x4, 0);
        assert!(matches!(layout.validate(), Err(Error::LayoutMismatch(_))));
    }

    #[test]
    fn overlap_is_rejected() {
        let layout = VertexLayout::new(32)
            .with(0, AttributeFormat::Float32x3, 0)
            .with(1, AttributeFormat::Float32x3, 8);
        assert!(matches!(layout.validate(), Err(Error::LayoutMismatch(_))));
    }

    #[test]
    fn duplicate_location_is_rejected() {
        let layout = VertexLayout::new(32)
            .with(0, AttributeFormat::Float32x2, 0)
            .with(0, AttributeFormat::Float32x2, 8);
        assert!(matches!(layout.validate(), Err(Error::LayoutMismatch(_))));
    }

    #[test]
    fn formats() {
        assert_eq!(AttributeFormat::Unorm8x4.size(), 4);
        assert!(AttributeFormat::Unorm8x4.normalized());
        assert_eq!(
            AttributeFormat::Unorm8x4.io_type(),
            IoType::new(ScalarType::Float, 4)
        );
        assert_eq!(AttributeFormat::Float32x3.size(), 12);
        assert_eq!(AttributeFormat::Sint32.io_type().scalar, ScalarType::Sint);
    }
}
