use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

use crate::device::{DeviceError, GpuInit};
use crate::frame::FrameHost;
use crate::lifecycle::Gfx;
use crate::Error;

use super::bootstrap::{create_entry, WindowSpec};
use super::entry::WindowEntry;
use super::RuntimeConfig;

/// Upper bound on pumps spent waiting for the first `resumed`.
const STARTUP_PUMPS: usize = 64;

struct PollHandler {
    spec: WindowSpec,
    gpu_init: GpuInit,
    entry: Option<WindowEntry>,
    init_error: Option<Error>,
    close_requested: bool,
}

impl ApplicationHandler for PollHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.init_error.is_some() {
            return;
        }

        match create_entry(event_loop, &self.spec, &self.gpu_init) {
            Ok(entry) => self.entry = Some(entry),
            Err(err) => self.init_error = Some(err),
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.close_requested = true;
            }

            WindowEvent::Resized(size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gfx_mut(|gfx| gfx.resize(size.width, size.height));
                }
            }

            _ => {}
        }
    }
}

/// Window + context driven by an explicit, caller-owned loop.
///
/// Each `poll_events` drains pending events without blocking. Drop order:
/// graphics objects, device, window, then the event loop.
pub struct PollPlatform {
    handler: PollHandler,
    event_loop: EventLoop<()>,
}

impl PollPlatform {
    /// Starts the windowing subsystem, opens the window and creates its context.
    pub fn initialize(config: &RuntimeConfig) -> Result<Self, Error> {
        let spec = config.window_spec()?;

        let mut event_loop = EventLoop::new().map_err(|e| Error::WindowInitFailed(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut handler = PollHandler {
            spec,
            gpu_init: config.gpu.clone(),
            entry: None,
            init_error: None,
            close_requested: false,
        };

        // The window can only be created once the loop reports `resumed`.
        for _ in 0..STARTUP_PUMPS {
            let status =
                event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut handler);

            if let Some(err) = handler.init_error.take() {
                return Err(err);
            }
            if handler.entry.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                return Err(Error::WindowInitFailed(format!(
                    "event loop exited during startup (code {code})"
                )));
            }
        }

        if handler.entry.is_none() {
            return Err(Error::WindowInitFailed(
                "event loop never resumed; no window was created".into(),
            ));
        }

        Ok(Self {
            handler,
            event_loop,
        })
    }

    /// One-time setup against the context (programs, geometry).
    pub fn load<S>(
        &mut self,
        setup: impl FnOnce(&mut Gfx<'_>) -> Result<S, Error>,
    ) -> Result<S, Error> {
        self.with_gfx(setup)
    }

    pub fn request_close(&mut self) {
        self.handler.close_requested = true;
    }

    /// Releases every graphics object now instead of at drop.
    pub fn teardown(&mut self) -> usize {
        match self.handler.entry.as_mut() {
            Some(entry) => entry.with_gfx_mut(|gfx| gfx.teardown()),
            None => 0,
        }
    }
}

impl FrameHost for PollPlatform {
    fn poll_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
    }

    fn should_close(&self) -> bool {
        self.handler.close_requested
    }

    fn with_gfx<R>(
        &mut self,
        f: impl FnOnce(&mut Gfx<'_>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        match self.handler.entry.as_mut() {
            Some(entry) => entry.with_gfx_mut(|gfx| f(gfx)),
            None => Err(DeviceError::TornDown.into()),
        }
    }
}
