use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use crate::device::{DeviceError, GpuInit};
use crate::frame::{FrameHost, FrameLoop, LoopState, LoopSummary, Scene};
use crate::lifecycle::Gfx;
use crate::time::Tick;
use crate::Error;

use super::bootstrap::{create_entry, WindowSpec};
use super::entry::WindowEntry;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub gpu: GpuInit,
    /// Stop after this many frames; 0 runs until the window closes.
    pub frame_limit: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            width: 1366,
            height: 768,
            gpu: GpuInit::default(),
            frame_limit: 0,
        }
    }
}

impl RuntimeConfig {
    pub fn window_spec(&self) -> Result<WindowSpec, Error> {
        WindowSpec::new(self.width, self.height, self.title.clone())
    }
}

/// Entry point for the callback-driven loop.
///
/// winit owns the loop; every `RedrawRequested` runs one frame iteration.
pub struct Runtime;

impl Runtime {
    pub fn run<S, C, L>(config: RuntimeConfig, clock: C, load: L) -> Result<LoopSummary>
    where
        S: Scene,
        C: Tick,
        L: FnOnce(&mut Gfx<'_>) -> Result<S, Error>,
    {
        let spec = config.window_spec()?;
        let event_loop = EventLoop::new()
            .map_err(|e| Error::WindowInitFailed(e.to_string()))
            .context("failed to create winit EventLoop")?;

        let mut state = AppState {
            spec,
            gpu_init: config.gpu,
            load: Some(load),
            scene: None,
            frame_loop: FrameLoop::new(clock).with_frame_limit(config.frame_limit),
            host: CallbackHost::default(),
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.error {
            return Err(err.into());
        }

        Ok(LoopSummary {
            frames: state.frame_loop.frames(),
        })
    }
}

#[derive(Default)]
struct CallbackHost {
    entry: Option<WindowEntry>,
    close_requested: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum CloseStep {
    RunClosingFrame,
    Exit,
}

impl CallbackHost {
    /// Raises the close flag. Without a loaded scene there is no frame to
    /// finish, so the loop exits directly.
    fn request_close(&mut self, scene_loaded: bool) -> CloseStep {
        self.close_requested = true;
        if scene_loaded {
            CloseStep::RunClosingFrame
        } else {
            CloseStep::Exit
        }
    }
}

impl FrameHost for CallbackHost {
    // Events arrive through `ApplicationHandler` before the redraw runs.
    fn poll_events(&mut self) {}

    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn with_gfx<R>(
        &mut self,
        f: impl FnOnce(&mut Gfx<'_>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        match self.entry.as_mut() {
            Some(entry) => entry.with_gfx_mut(|gfx| f(gfx)),
            None => Err(DeviceError::TornDown.into()),
        }
    }
}

struct AppState<S, C: Tick, L> {
    spec: WindowSpec,
    gpu_init: GpuInit,
    load: Option<L>,
    scene: Option<S>,
    frame_loop: FrameLoop<C>,
    host: CallbackHost,
    error: Option<Error>,
}

impl<S, C, L> AppState<S, C, L>
where
    S: Scene,
    C: Tick,
    L: FnOnce(&mut Gfx<'_>) -> Result<S, Error>,
{
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(entry) = self.host.entry.as_ref() {
            entry.borrow_window().request_redraw();
        }
    }

    /// Runs the closing iteration immediately; a hidden window may never
    /// receive another `RedrawRequested`.
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        match self.host.request_close(self.scene.is_some()) {
            CloseStep::RunClosingFrame => self.redraw(event_loop),
            CloseStep::Exit => event_loop.exit(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        match self.frame_loop.iterate(&mut self.host, scene) {
            Ok(LoopState::Running) => self.request_redraw(),
            Ok(LoopState::Closing) => event_loop.exit(),
            Err(err) => self.fail(event_loop, err),
        }
    }
}

impl<S, C, L> ApplicationHandler for AppState<S, C, L>
where
    S: Scene,
    C: Tick,
    L: FnOnce(&mut Gfx<'_>) -> Result<S, Error>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.entry.is_some() {
            return;
        }

        match create_entry(event_loop, &self.spec, &self.gpu_init) {
            Ok(entry) => self.host.entry = Some(entry),
            Err(err) => return self.fail(event_loop, err),
        }

        if let Some(load) = self.load.take() {
            match self.host.with_gfx(load) {
                Ok(scene) => self.scene = Some(scene),
                Err(err) => return self.fail(event_loop, err),
            }
        }

        self.request_redraw();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.close(event_loop)
            }

            WindowEvent::Resized(size) => {
                if let Some(entry) = self.host.entry.as_mut() {
                    entry.with_gfx_mut(|gfx| gfx.resize(size.width, size.height));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release graphics objects and the window while the loop is still alive.
        self.scene = None;
        self.host.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameLoop, LoopState, Scene};
    use crate::time::FixedClock;

    struct Idle;

    impl Scene for Idle {
        fn draw(&mut self, _gfx: &mut Gfx<'_>) -> Result<(), Error> {
            Ok(())
        }
    }

    // ── close handling ────────────────────────────────────────────────────

    #[test]
    fn close_with_scene_runs_the_closing_frame_now() {
        let mut host = CallbackHost::default();
        assert_eq!(host.request_close(true), CloseStep::RunClosingFrame);
        assert!(host.should_close());
    }

    #[test]
    fn close_before_load_exits_directly() {
        let mut host = CallbackHost::default();
        assert_eq!(host.request_close(false), CloseStep::Exit);
        assert!(host.should_close());
    }

    #[test]
    fn closing_frame_without_window_reports_torn_down() {
        let mut host = CallbackHost::default();
        host.request_close(true);

        let mut frame_loop = FrameLoop::new(FixedClock::hz(60));
        let err = frame_loop.iterate(&mut host, &mut Idle).unwrap_err();
        assert!(matches!(err, Error::Device(DeviceError::TornDown)));
        assert_eq!(frame_loop.state(), LoopState::Closing);
    }
}
