use crate::device::{report, Color, DebugMode, GraphicsDevice, RasterState, UniformLocation};
use crate::geometry::{upload_geometry, Geometry, Vertex};
use crate::shader::{build_program, ShaderLibrary, ShaderProgram};
use crate::Error;

use super::ResourceSet;

/// A graphics device together with every object created through it.
///
/// Objects are released in reverse creation order by [`Gfx::teardown`] or,
/// failing that, on drop. The device itself is dropped after its objects.
///
/// Not `Send`: the device belongs to the thread that created its window.
pub struct Gfx<'d> {
    resources: ResourceSet,
    debug_mode: DebugMode,
    device: Box<dyn GraphicsDevice + 'd>,
}

impl<'d> Gfx<'d> {
    pub fn new(device: impl GraphicsDevice + 'd, debug_mode: DebugMode) -> Self {
        log::debug!("graphics device ready ({}, {debug_mode:?})", device.backend_name());
        Self {
            resources: ResourceSet::default(),
            debug_mode,
            device: Box::new(device),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.device.backend_name()
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.debug_mode
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    pub fn build_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ShaderProgram, Error> {
        build_program(
            self.device.as_mut(),
            &mut self.resources,
            vertex_source,
            fragment_source,
        )
    }

    /// Builds a program from two named sources in `library`.
    pub fn load_program(
        &mut self,
        library: &ShaderLibrary,
        vertex_name: &str,
        fragment_name: &str,
    ) -> Result<ShaderProgram, Error> {
        let vertex = library.load_text(vertex_name)?;
        let fragment = library.load_text(fragment_name)?;
        self.build_program(&vertex, &fragment)
    }

    pub fn upload_geometry<V: Vertex>(
        &mut self,
        program: &ShaderProgram,
        vertices: &[V],
        indices: Option<&[u32]>,
        raster: RasterState,
    ) -> Result<Geometry, Error> {
        upload_geometry(
            self.device.as_mut(),
            &mut self.resources,
            program,
            vertices,
            indices,
            raster,
        )
    }

    pub fn set_uniform(
        &mut self,
        program: &ShaderProgram,
        location: UniformLocation,
        bytes: &[u8],
    ) -> Result<(), Error> {
        self.resources.ensure_open()?;
        self.device.set_uniform(program.id(), location, bytes)?;
        Ok(())
    }

    pub fn clear(&mut self, color: Color, depth: bool) -> Result<(), Error> {
        self.resources.ensure_open()?;
        self.device.clear(color, depth);
        Ok(())
    }

    pub fn draw(&mut self, geometry: &Geometry) -> Result<(), Error> {
        self.resources.ensure_open()?;
        self.device.draw(&geometry.draw_call())?;
        Ok(())
    }

    /// Presents the frame, then applies the debug mode to anything the API
    /// reported while producing it.
    pub fn present(&mut self) -> Result<(), Error> {
        self.resources.ensure_open()?;
        self.device.present()?;
        self.check_debug()
    }

    pub fn check_debug(&mut self) -> Result<(), Error> {
        report(self.device.drain_debug_messages(), self.debug_mode)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.device.resize(width, height);
    }

    /// Releases every tracked object. Idempotent; returns how many were released.
    pub fn teardown(&mut self) -> usize {
        let released = self.resources.release_all(self.device.as_mut());
        if released > 0 {
            log::info!("released {released} device objects");
        }
        // Surface whatever the releases themselves triggered; nothing to abort anymore.
        let _ = report(self.device.drain_debug_messages(), DebugMode::Log);
        released
    }
}

impl Drop for Gfx<'_> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{
        Command, DebugMessage, DebugSeverity, DeviceError, RecordingDevice, Resource,
    };
    use crate::geometry::ColorVertex;

    const VS: &str = r#"
@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0);
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

    fn verts() -> [ColorVertex; 3] {
        [
            ColorVertex::new([-0.5, -0.5], Color::RED),
            ColorVertex::new([0.0, 0.5], Color::GREEN),
            ColorVertex::new([0.5, -0.5], Color::BLUE),
        ]
    }

    fn releases(recorder: &RecordingDevice) -> usize {
        recorder.count(|c| matches!(c, Command::Release(_)))
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn teardown_is_idempotent() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut gfx = Gfx::new(dev, DebugMode::Log);

        let program = gfx.build_program(VS, FS).unwrap();
        gfx.upload_geometry(&program, &verts(), None, RasterState::default())
            .unwrap();

        assert_eq!(gfx.teardown(), 3);
        assert_eq!(gfx.teardown(), 0);
        drop(gfx);

        assert_eq!(releases(&recorder), 3);
        assert_eq!(recorder.invalid_releases(), 0);
        assert_eq!(recorder.live_objects(), 0);
    }

    #[test]
    fn teardown_order_is_vertex_array_then_buffer_then_program() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut gfx = Gfx::new(dev, DebugMode::Log);

        let program = gfx.build_program(VS, FS).unwrap();
        let geo = gfx
            .upload_geometry(&program, &verts(), None, RasterState::default())
            .unwrap();
        gfx.teardown();

        let order: Vec<Resource> = recorder
            .commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Release(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(
            order,
            vec![
                Resource::VertexArray(geo.vertex_array()),
                Resource::Buffer(geo.vertex_buffer()),
                Resource::Program(program.id()),
            ]
        );
    }

    #[test]
    fn drop_releases_everything() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        {
            let mut gfx = Gfx::new(dev, DebugMode::Log);
            gfx.build_program(VS, FS).unwrap();
        }
        assert_eq!(releases(&recorder), 1);
        assert_eq!(recorder.live_objects(), 0);
    }

    #[test]
    fn partial_setup_releases_only_what_was_acquired() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut gfx = Gfx::new(dev, DebugMode::Log);

        let program = gfx.build_program(VS, FS).unwrap();
        recorder.fail_vertex_arrays();
        assert!(gfx
            .upload_geometry(&program, &verts(), None, RasterState::default())
            .is_err());

        // program + vertex buffer; the vertex array never existed
        assert_eq!(gfx.teardown(), 2);
        assert_eq!(recorder.invalid_releases(), 0);
    }

    #[test]
    fn creation_after_teardown_fails() {
        let mut gfx = Gfx::new(RecordingDevice::new(), DebugMode::Log);
        gfx.teardown();

        assert!(matches!(
            gfx.build_program(VS, FS),
            Err(Error::Device(DeviceError::TornDown))
        ));
        assert!(matches!(
            gfx.present(),
            Err(Error::Device(DeviceError::TornDown))
        ));
    }

    #[test]
    fn clear_after_teardown_never_reaches_the_device() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut gfx = Gfx::new(dev, DebugMode::Log);
        gfx.teardown();

        assert!(matches!(
            gfx.clear(Color::BLACK, true),
            Err(Error::Device(DeviceError::TornDown))
        ));
        assert_eq!(recorder.count(|c| matches!(c, Command::Clear { .. })), 0);
    }

    // ── debug routing ─────────────────────────────────────────────────────

    #[test]
    fn strict_mode_fails_present_on_api_error() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut gfx = Gfx::new(dev, DebugMode::Strict);

        recorder.inject_debug(DebugMessage::new(DebugSeverity::Error, "bad draw"));
        assert!(matches!(
            gfx.present(),
            Err(Error::Device(DeviceError::Debug(_)))
        ));
        // the frame was still presented
        assert_eq!(recorder.count(|c| matches!(c, Command::Present)), 1);
    }

    #[test]
    fn log_mode_keeps_going() {
        let dev = RecordingDevice::new();
        let recorder = dev.clone();
        let mut gfx = Gfx::new(dev, DebugMode::Log);

        recorder.inject_debug(DebugMessage::new(DebugSeverity::Error, "bad draw"));
        assert!(gfx.present().is_ok());
    }
}
