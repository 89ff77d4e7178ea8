use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::geometry::VertexLayout;
use crate::shader::{LinkedProgram, ShaderStage};

use super::api::{
    BufferDesc, BufferId, BufferKind, Color, DeviceError, DrawCall, DrawMode, GraphicsDevice,
    IndexFormat, ProgramId, Resource, UniformLocation, VertexArrayDesc, VertexArrayId,
};
use super::debug::{DebugChannel, DebugMessage};
use super::surface::Swapchain;
use super::GpuInit;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

static API_BINDINGS: OnceLock<wgpu::Instance> = OnceLock::new();

/// Resolves the API entry points. Happens once per process; later windows
/// reuse the first instance.
fn api_bindings(backends: wgpu::Backends) -> &'static wgpu::Instance {
    let mut resolved_now = false;
    let instance = API_BINDINGS.get_or_init(|| {
        resolved_now = true;
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        })
    });

    if resolved_now {
        log::debug!("graphics API bindings resolved for {backends:?}");
    }
    instance
}

/// Per-program device objects: stage modules, pipeline layout, uniform storage.
struct GpuProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
    layout: wgpu::PipelineLayout,
    bind_group: Option<wgpu::BindGroup>,
    uniforms: HashMap<u32, wgpu::Buffer>,
}

struct GpuVertexArray {
    program: ProgramId,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: BufferId,
    index_buffer: Option<(BufferId, IndexFormat)>,
    depth_test: bool,
}

struct DepthTarget {
    size: PhysicalSize<u32>,
    view: wgpu::TextureView,
}

#[derive(Default)]
struct PendingFrame {
    clear: Option<(Color, bool)>,
    draws: Vec<DrawCall>,
}

/// wgpu-backed graphics device bound to one window.
///
/// Owns the surface (swapchain), logical device and queue, plus every
/// program/buffer/vertex array created through [`GraphicsDevice`]. Draw
/// calls are recorded per frame and encoded into a single render pass on
/// `present`.
pub struct Gpu<'w> {
    window: &'w Window,

    /// Surface lifetime is tied to the window; the window must outlive the `Gpu`.
    swapchain: Swapchain<'w>,

    backend_name: String,
    device: wgpu::Device,
    queue: wgpu::Queue,

    depth: Option<DepthTarget>,

    debug: DebugChannel,

    programs: HashMap<ProgramId, GpuProgram>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    vertex_arrays: HashMap<VertexArrayId, GpuVertexArray>,
    next_id: u32,

    frame: PendingFrame,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = api_bindings(init.backends);

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        log::info!(
            "using adapter {} ({:?}, driver {})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.driver
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let debug = DebugChannel::default();
        let sink = debug.clone();
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            sink.push(DebugMessage::from_wgpu(&err));
        }));

        let swapchain = Swapchain::new(surface, &adapter, &device, size, &init)?;

        Ok(Self {
            window,
            swapchain,
            backend_name: format!("{:?}", adapter_info.backend).to_lowercase(),
            device,
            queue,
            depth: None,
            debug,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            next_id: 1,
            frame: PendingFrame::default(),
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.swapchain.format()
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.swapchain.size()
    }

    fn next_raw_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn ensure_depth_target(&mut self) {
        let size = self.swapchain.size();
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("prism depth"),
            size: self.swapchain.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.depth = Some(DepthTarget {
            size,
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        });
    }

    fn encode_draw(&self, rpass: &mut wgpu::RenderPass<'_>, call: &DrawCall) {
        let Some(vao) = self.vertex_arrays.get(&call.vertex_array) else {
            log::warn!("{} vanished before present; draw skipped", call.vertex_array);
            return;
        };
        let Some(program) = self.programs.get(&vao.program) else { return };
        let Some(vbo) = self.buffers.get(&vao.vertex_buffer) else { return };

        rpass.set_pipeline(&vao.pipeline);
        if let Some(bind_group) = program.bind_group.as_ref() {
            rpass.set_bind_group(0, bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, vbo.slice(..));

        match call.mode {
            DrawMode::Arrays { first, count } => {
                rpass.draw(first..first + count, 0..1);
            }
            DrawMode::Elements { count } => {
                let Some((ibo_id, format)) = vao.index_buffer else {
                    log::warn!("{} has no index buffer; indexed draw skipped", call.vertex_array);
                    return;
                };
                let Some(ibo) = self.buffers.get(&ibo_id) else { return };
                rpass.set_index_buffer(ibo.slice(..), to_wgpu_index(format));
                rpass.draw_indexed(0..count, 0, 0..1);
            }
        }
    }
}

impl GraphicsDevice for Gpu<'_> {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn create_program(&mut self, program: &LinkedProgram) -> Result<ProgramId, DeviceError> {
        let id = ProgramId(self.next_raw_id());

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism vertex stage"),
            source: wgpu::ShaderSource::Wgsl(program.vertex().source().into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism fragment stage"),
            source: wgpu::ShaderSource::Wgsl(program.fragment().source().into()),
        });

        let uniforms = program.interface().uniforms();

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
            .iter()
            .map(|u| {
                let mut visibility = wgpu::ShaderStages::NONE;
                if u.stages.contains(ShaderStage::Vertex) {
                    visibility |= wgpu::ShaderStages::VERTEX;
                }
                if u.stages.contains(ShaderStage::Fragment) {
                    visibility |= wgpu::ShaderStages::FRAGMENT;
                }
                wgpu::BindGroupLayoutEntry {
                    binding: u.binding,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(u.size as u64),
                    },
                    count: None,
                }
            })
            .collect();

        let bind_group_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("prism program bgl"),
                entries: &layout_entries,
            });

        let mut uniform_buffers = HashMap::new();
        for u in uniforms {
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(u.name.as_str()),
                // Uniform buffer sizes are kept 16-byte aligned.
                size: (u.size as u64).next_multiple_of(16),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            uniform_buffers.insert(u.binding, buffer);
        }

        let bind_group = if uniforms.is_empty() {
            None
        } else {
            let entries: Vec<wgpu::BindGroupEntry> = uniforms
                .iter()
                .filter_map(|u| {
                    uniform_buffers.get(&u.binding).map(|buffer| wgpu::BindGroupEntry {
                        binding: u.binding,
                        resource: buffer.as_entire_binding(),
                    })
                })
                .collect();
            Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("prism program bind group"),
                layout: &bind_group_layout,
                entries: &entries,
            }))
        };

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("prism pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        self.programs.insert(
            id,
            GpuProgram {
                vertex,
                fragment,
                vertex_entry: program.vertex().entry_point().to_string(),
                fragment_entry: program.fragment().entry_point().to_string(),
                layout,
                bind_group,
                uniforms: uniform_buffers,
            },
        );

        log::debug!("created {id} ({} uniforms)", uniforms.len());
        Ok(id)
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId, DeviceError> {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        // Static draw: contents are written once and never updated.
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: desc.contents,
                usage,
            });

        let id = BufferId(self.next_raw_id());
        self.buffers.insert(id, buffer);
        log::debug!("created {id} ({} bytes, {:?})", desc.contents.len(), desc.kind);
        Ok(id)
    }

    fn create_vertex_array(
        &mut self,
        desc: &VertexArrayDesc<'_>,
    ) -> Result<VertexArrayId, DeviceError> {
        let program = self
            .programs
            .get(&desc.program)
            .ok_or(DeviceError::InvalidHandle(Resource::Program(desc.program)))?;

        if !self.buffers.contains_key(&desc.vertex_buffer) {
            return Err(DeviceError::InvalidHandle(Resource::Buffer(desc.vertex_buffer)));
        }
        if let Some((ibo, _)) = desc.index_buffer {
            if !self.buffers.contains_key(&ibo) {
                return Err(DeviceError::InvalidHandle(Resource::Buffer(ibo)));
            }
        }

        let attributes = wgpu_attributes(desc.layout);

        let depth_stencil = desc.raster.depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&program.layout),

            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(program.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: desc.layout.stride(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(program.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.swapchain.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let id = VertexArrayId(self.next_raw_id());
        self.vertex_arrays.insert(
            id,
            GpuVertexArray {
                program: desc.program,
                pipeline,
                vertex_buffer: desc.vertex_buffer,
                index_buffer: desc.index_buffer,
                depth_test: desc.raster.depth_test,
            },
        );
        log::debug!("created {id} for {}", desc.program);
        Ok(id)
    }

    fn set_uniform(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
        bytes: &[u8],
    ) -> Result<(), DeviceError> {
        let gpu_program = self
            .programs
            .get(&program)
            .ok_or(DeviceError::InvalidHandle(Resource::Program(program)))?;

        if bytes.len() != location.size as usize {
            return Err(DeviceError::UniformSize {
                binding: location.binding,
                expected: location.size,
                actual: bytes.len(),
            });
        }

        let buffer = gpu_program.uniforms.get(&location.binding).ok_or_else(|| {
            DeviceError::Backend(format!("{program} has no uniform at binding {}", location.binding))
        })?;

        self.queue.write_buffer(buffer, 0, bytes);
        Ok(())
    }

    fn clear(&mut self, color: Color, depth: bool) {
        self.frame.clear = Some((color, depth));
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), DeviceError> {
        let vao = self
            .vertex_arrays
            .get(&call.vertex_array)
            .ok_or(DeviceError::InvalidHandle(Resource::VertexArray(call.vertex_array)))?;

        if vao.program != call.program {
            return Err(DeviceError::ProgramMismatch {
                vertex_array: call.vertex_array,
                expected: vao.program,
                actual: call.program,
            });
        }

        self.frame.draws.push(*call);
        Ok(())
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        let pending = std::mem::take(&mut self.frame);

        let Some(surface_texture) = self.swapchain.acquire(&self.device)? else {
            return Ok(());
        };

        let needs_depth = pending.draws.iter().any(|d| {
            self.vertex_arrays
                .get(&d.vertex_array)
                .is_some_and(|v| v.depth_test)
        });
        if needs_depth {
            self.ensure_depth_target();
        }

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        // An acquired surface texture has undefined contents; frames without an
        // explicit clear start from black.
        let (clear_color, clear_depth) = pending.clear.unwrap_or((Color::BLACK, true));

        {
            let depth_stencil_attachment = if needs_depth {
                self.depth
                    .as_ref()
                    .map(|d| wgpu::RenderPassDepthStencilAttachment {
                        view: &d.view,
                        depth_ops: Some(wgpu::Operations {
                            load: depth_load(clear_depth),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    })
            } else {
                None
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("prism frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear_color.r as f64,
                            g: clear_color.g as f64,
                            b: clear_color.b as f64,
                            a: clear_color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for call in &pending.draws {
                self.encode_draw(&mut rpass, call);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();
        Ok(())
    }

    fn release(&mut self, resource: Resource) -> Result<(), DeviceError> {
        let found = match resource {
            Resource::Program(id) => self.programs.remove(&id).is_some(),
            Resource::Buffer(id) => match self.buffers.remove(&id) {
                Some(buffer) => {
                    buffer.destroy();
                    true
                }
                None => false,
            },
            Resource::VertexArray(id) => self.vertex_arrays.remove(&id).is_some(),
        };

        if !found {
            return Err(DeviceError::InvalidHandle(resource));
        }
        log::debug!("released {resource}");
        Ok(())
    }

    fn drain_debug_messages(&mut self) -> Vec<DebugMessage> {
        self.debug.drain()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.swapchain.resize(&self.device, width, height);
    }
}

/// Depth load op for a frame: cleared to the far plane, or kept from the
/// previous frame when the clear skipped depth.
fn depth_load(clear_depth: bool) -> wgpu::LoadOp<f32> {
    if clear_depth {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    }
}

fn wgpu_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes()
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: a.format.to_wgpu(),
            offset: a.offset,
            shader_location: a.location,
        })
        .collect()
}

fn to_wgpu_index(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::U16 => wgpu::IndexFormat::Uint16,
        IndexFormat::U32 => wgpu::IndexFormat::Uint32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_clear_follows_the_clear_flag() {
        assert_eq!(depth_load(true), wgpu::LoadOp::Clear(1.0));
        assert_eq!(depth_load(false), wgpu::LoadOp::Load);
    }
}
