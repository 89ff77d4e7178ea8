use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::geometry::VertexLayout;
use crate::shader::{LinkedProgram, ProgramInterface};

use super::api::{
    BufferDesc, BufferId, BufferKind, Color, DeviceError, DrawCall, GraphicsDevice, ProgramId,
    Resource, UniformLocation, VertexArrayDesc, VertexArrayId,
};
use super::debug::DebugMessage;

/// One command as observed by [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateProgram(ProgramId),
    CreateBuffer { id: BufferId, kind: BufferKind, len: usize },
    CreateVertexArray { id: VertexArrayId, program: ProgramId },
    SetUniform { program: ProgramId, binding: u32, bytes: Vec<u8> },
    Clear { color: Color, depth: bool },
    Draw(DrawCall),
    Present,
    Release(Resource),
}

#[derive(Debug, Clone)]
pub struct RecordedVertexArray {
    pub program: ProgramId,
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub layout: VertexLayout,
    pub depth_test: bool,
}

#[derive(Default)]
struct State {
    commands: Vec<Command>,
    programs: HashMap<ProgramId, ProgramInterface>,
    buffers: HashMap<BufferId, Vec<u8>>,
    vertex_arrays: HashMap<VertexArrayId, RecordedVertexArray>,
    next_id: u32,
    invalid_releases: usize,
    pending_debug: Vec<DebugMessage>,
    fail_vertex_arrays: bool,
}

impl State {
    fn next_raw_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Headless device that records every command instead of rendering.
///
/// Cloning yields another handle to the same recording, so a test can keep
/// one clone for inspection while the engine owns the other.
#[derive(Clone, Default)]
pub struct RecordingDevice {
    state: Rc<RefCell<State>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `create_vertex_array` fail, to exercise partial setup.
    pub fn fail_vertex_arrays(&self) {
        self.state.borrow_mut().fail_vertex_arrays = true;
    }

    /// Queues a message as if the API's debug callback had fired.
    pub fn inject_debug(&self, message: DebugMessage) {
        self.state.borrow_mut().pending_debug.push(message);
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.state.borrow().commands.iter().filter(|c| pred(c)).count()
    }

    /// Number of objects created and not yet released.
    pub fn live_objects(&self) -> usize {
        let s = self.state.borrow();
        s.programs.len() + s.buffers.len() + s.vertex_arrays.len()
    }

    /// Releases of unknown or already released handles.
    pub fn invalid_releases(&self) -> usize {
        self.state.borrow().invalid_releases
    }

    pub fn buffer_contents(&self, id: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).cloned()
    }

    pub fn vertex_array(&self, id: VertexArrayId) -> Option<RecordedVertexArray> {
        self.state.borrow().vertex_arrays.get(&id).cloned()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn backend_name(&self) -> &str {
        "recording"
    }

    fn create_program(&mut self, program: &LinkedProgram) -> Result<ProgramId, DeviceError> {
        let mut s = self.state.borrow_mut();
        let id = ProgramId(s.next_raw_id());
        s.programs.insert(id, program.interface().clone());
        s.commands.push(Command::CreateProgram(id));
        Ok(id)
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId, DeviceError> {
        let mut s = self.state.borrow_mut();
        let id = BufferId(s.next_raw_id());
        s.buffers.insert(id, desc.contents.to_vec());
        s.commands.push(Command::CreateBuffer {
            id,
            kind: desc.kind,
            len: desc.contents.len(),
        });
        Ok(id)
    }

    fn create_vertex_array(
        &mut self,
        desc: &VertexArrayDesc<'_>,
    ) -> Result<VertexArrayId, DeviceError> {
        let mut s = self.state.borrow_mut();

        if s.fail_vertex_arrays {
            return Err(DeviceError::Backend("vertex array creation disabled".into()));
        }
        if !s.programs.contains_key(&desc.program) {
            return Err(DeviceError::InvalidHandle(Resource::Program(desc.program)));
        }
        let index_buffer = desc.index_buffer.map(|(id, _)| id);
        for buffer in std::iter::once(desc.vertex_buffer).chain(index_buffer) {
            if !s.buffers.contains_key(&buffer) {
                return Err(DeviceError::InvalidHandle(Resource::Buffer(buffer)));
            }
        }

        let id = VertexArrayId(s.next_raw_id());
        s.vertex_arrays.insert(
            id,
            RecordedVertexArray {
                program: desc.program,
                vertex_buffer: desc.vertex_buffer,
                index_buffer,
                layout: desc.layout.clone(),
                depth_test: desc.raster.depth_test,
            },
        );
        s.commands.push(Command::CreateVertexArray {
            id,
            program: desc.program,
        });
        Ok(id)
    }

    fn set_uniform(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
        bytes: &[u8],
    ) -> Result<(), DeviceError> {
        let mut s = self.state.borrow_mut();

        let interface = s
            .programs
            .get(&program)
            .ok_or(DeviceError::InvalidHandle(Resource::Program(program)))?;
        if !interface.uniforms().iter().any(|u| u.binding == location.binding) {
            return Err(DeviceError::Backend(format!(
                "{program} has no uniform at binding {}",
                location.binding
            )));
        }
        if bytes.len() != location.size as usize {
            return Err(DeviceError::UniformSize {
                binding: location.binding,
                expected: location.size,
                actual: bytes.len(),
            });
        }

        s.commands.push(Command::SetUniform {
            program,
            binding: location.binding,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn clear(&mut self, color: Color, depth: bool) {
        self.state
            .borrow_mut()
            .commands
            .push(Command::Clear { color, depth });
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), DeviceError> {
        let mut s = self.state.borrow_mut();

        let vao = s
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

        s.commands.push(Command::Draw(*call));
        Ok(())
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        self.state.borrow_mut().commands.push(Command::Present);
        Ok(())
    }

    fn release(&mut self, resource: Resource) -> Result<(), DeviceError> {
        let mut s = self.state.borrow_mut();

        let found = match resource {
            Resource::Program(id) => s.programs.remove(&id).is_some(),
            Resource::Buffer(id) => s.buffers.remove(&id).is_some(),
            Resource::VertexArray(id) => s.vertex_arrays.remove(&id).is_some(),
        };
        if !found {
            s.invalid_releases += 1;
            return Err(DeviceError::InvalidHandle(resource));
        }

        s.commands.push(Command::Release(resource));
        Ok(())
    }

    fn drain_debug_messages(&mut self) -> Vec<DebugMessage> {
        std::mem::take(&mut self.state.borrow_mut().pending_debug)
    }
}
