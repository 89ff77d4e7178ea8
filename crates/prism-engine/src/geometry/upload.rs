use crate::device::{
    BufferDesc, BufferId, BufferKind, DrawCall, DrawMode, GraphicsDevice, IndexFormat, ProgramId,
    RasterState, Resource, VertexArrayDesc, VertexArrayId,
};
use crate::lifecycle::ResourceSet;
use crate::shader::{ProgramInterface, ShaderProgram};
use crate::Error;

use super::vertex::{Vertex, VertexLayout};

/// Uploaded mesh: buffers plus the vertex array binding them to a program.
#[derive(Debug, Clone)]
pub struct Geometry {
    program: ProgramId,
    vertex_array: VertexArrayId,
    vertex_buffer: BufferId,
    index_buffer: Option<BufferId>,
    vertex_count: u32,
    index_count: u32,
    layout: VertexLayout,
}

impl Geometry {
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn vertex_array(&self) -> VertexArrayId {
        self.vertex_array
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<BufferId> {
        self.index_buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Indexed draw when an index buffer exists, otherwise all vertices in order.
    pub fn draw_call(&self) -> DrawCall {
        let mode = match self.index_buffer {
            Some(_) => DrawMode::Elements {
                count: self.index_count,
            },
            None => DrawMode::Arrays {
                first: 0,
                count: self.vertex_count,
            },
        };
        DrawCall {
            program: self.program,
            vertex_array: self.vertex_array,
            mode,
        }
    }
}

/// Checks that every vertex input of the program is fed by the layout.
///
/// Layout attributes the program never reads are allowed.
pub fn check_layout(layout: &VertexLayout, interface: &ProgramInterface) -> Result<(), Error> {
    layout.validate()?;

    for input in interface.inputs() {
        let Some(attr) = layout.attribute(input.location) else {
            return Err(Error::LayoutMismatch(format!(
                "program input `{}` at location {} has no attribute in the layout",
                input.name, input.location
            )));
        };

        let provided = attr.format.io_type();
        if provided != input.ty {
            return Err(Error::LayoutMismatch(format!(
                "program input `{}` at location {} expects {}, layout provides {} ({:?})",
                input.name, input.location, input.ty, provided, attr.format
            )));
        }
    }

    for attr in layout.attributes() {
        if !interface.inputs().iter().any(|i| i.location == attr.location) {
            log::debug!("attribute at location {} is unused by the program", attr.location);
        }
    }

    Ok(())
}

/// Uploads vertices (and optional indices) and binds them to `program`.
///
/// Every object is tracked as soon as it exists, so a failure part-way
/// leaves only acquired objects for teardown.
pub fn upload_geometry<V: Vertex>(
    device: &mut dyn GraphicsDevice,
    resources: &mut ResourceSet,
    program: &ShaderProgram,
    vertices: &[V],
    indices: Option<&[u32]>,
    raster: RasterState,
) -> Result<Geometry, Error> {
    resources.ensure_open()?;

    if vertices.is_empty() || indices.is_some_and(<[u32]>::is_empty) {
        return Err(Error::EmptyGeometry);
    }

    let layout = V::layout();
    check_layout(&layout, program.interface())?;

    if let Some(indices) = indices {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }
    }

    let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
    debug_assert_eq!(vertex_bytes.len() as u64, vertices.len() as u64 * layout.stride());

    let vertex_buffer = device.create_buffer(&BufferDesc {
        label: "vertex buffer",
        kind: BufferKind::Vertex,
        contents: vertex_bytes,
    })?;
    resources.track(Resource::Buffer(vertex_buffer));

    let index_buffer = match indices {
        Some(indices) => {
            let id = device.create_buffer(&BufferDesc {
                label: "index buffer",
                kind: BufferKind::Index,
                contents: bytemuck::cast_slice(indices),
            })?;
            resources.track(Resource::Buffer(id));
            Some(id)
        }
        None => None,
    };

    let vertex_array = device.create_vertex_array(&VertexArrayDesc {
        label: "vertex array",
        program: program.id(),
        vertex_buffer,
        index_buffer: index_buffer.map(|id| (id, IndexFormat::U32)),
        layout: &layout,
        raster,
    })?;
    resources.track(Resource::VertexArray(vertex_array));

    log::debug!(
        "uploaded {} vertices ({} bytes), {} indices",
        vertices.len(),
        vertex_bytes.len(),
        indices.map_or(0, <[u32]>::len)
    );

    Ok(Geometry {
        program: program.id(),
        vertex_array,
        vertex_buffer,
        index_buffer,
        vertex_count: vertices.len() as u32,
        index_count: indices.map_or(0, |i| i.len() as u32),
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Color, Command, RecordingDevice};
    use crate::geometry::{ColorVertex, NormalVertex};
    use crate::shader::build_program;

    const VS: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(position, 0.0, 1.0);
    out.color = color;
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

    struct Fixture {
        dev: RecordingDevice,
        recorder: RecordingDevice,
        resources: ResourceSet,
        program: ShaderProgram,
    }

    fn fixture() -> Fixture {
        let mut dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut resources = ResourceSet::default();
        let program = build_program(&mut dev, &mut resources, VS, FS).unwrap();
        Fixture {
            dev,
            recorder,
            resources,
            program,
        }
    }

    fn tri() -> [ColorVertex; 3] {
        [
            ColorVertex::new([-0.5, -0.5], Color::RED),
            ColorVertex::new([0.0, 0.5], Color::GREEN),
            ColorVertex::new([0.5, -0.5], Color::BLUE),
        ]
    }

    // ── happy path ────────────────────────────────────────────────────────

    #[test]
    fn non_indexed_upload() {
        let mut f = fixture();
        let verts = tri();
        let geo = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            None,
            RasterState::default(),
        )
        .unwrap();

        assert_eq!(
            f.recorder.buffer_contents(geo.vertex_buffer()).map(|b| b.len()),
            Some(3 * 24)
        );
        assert_eq!(
            geo.draw_call().mode,
            DrawMode::Arrays { first: 0, count: 3 }
        );
        // program + vbo + vao
        assert_eq!(f.resources.len(), 3);
    }

    #[test]
    fn indexed_upload_draws_elements() {
        let mut f = fixture();
        let verts = tri();
        let geo = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            Some(&[0, 1, 2, 2, 1, 0]),
            RasterState { depth_test: true },
        )
        .unwrap();

        assert_eq!(geo.draw_call().mode, DrawMode::Elements { count: 6 });
        let vao = f.recorder.vertex_array(geo.vertex_array()).unwrap();
        assert!(vao.depth_test);
        assert_eq!(vao.index_buffer, geo.index_buffer());
        assert_eq!(
            f.recorder.buffer_contents(vao.index_buffer.unwrap()).map(|b| b.len()),
            Some(24)
        );
    }

    // ── rejections ────────────────────────────────────────────────────────

    #[test]
    fn wrong_component_count_is_a_layout_mismatch() {
        let mut f = fixture();
        let verts = [NormalVertex::new([0.0; 3], [0.0, 0.0, 1.0])];
        let err = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            None,
            RasterState::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::LayoutMismatch(_)));
        // nothing beyond the program was created
        assert_eq!(
            f.recorder
                .count(|c| matches!(c, Command::CreateBuffer { .. })),
            0
        );
    }

    #[test]
    fn out_of_range_index() {
        let mut f = fixture();
        let verts = tri();
        let err = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            Some(&[0, 1, 3]),
            RasterState::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn empty_vertices() {
        let mut f = fixture();
        let verts: [ColorVertex; 0] = [];
        let err = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            None,
            RasterState::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptyGeometry));
    }

    #[test]
    fn empty_index_slice_is_rejected_before_allocation() {
        let mut f = fixture();
        let verts = tri();
        let tracked = f.resources.len();

        let err = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            Some(&[]),
            RasterState::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::EmptyGeometry));
        assert_eq!(f.recorder.count(|c| matches!(c, Command::CreateBuffer { .. })), 0);
        assert_eq!(f.resources.len(), tracked);
    }

    #[test]
    fn failed_vertex_array_keeps_acquired_buffers_tracked() {
        let mut f = fixture();
        f.recorder.fail_vertex_arrays();
        let verts = tri();

        let result = upload_geometry(
            &mut f.dev,
            &mut f.resources,
            &f.program,
            &verts,
            Some(&[0, 1, 2]),
            RasterState::default(),
        );

        assert!(matches!(result, Err(Error::Device(_))));
        // program + vbo + ibo
        assert_eq!(f.resources.len(), 3);
        assert_eq!(f.recorder.live_objects(), 3);
    }
}
