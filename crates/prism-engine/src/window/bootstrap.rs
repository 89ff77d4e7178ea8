use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::device::{Gpu, GpuInit};
use crate::lifecycle::Gfx;
use crate::Error;

use super::entry::{WindowEntry, WindowEntryTryBuilder};

/// A validated request for a fixed-size window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    width: u32,
    height: u32,
    title: String,
}

impl WindowSpec {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Result<Self, Error> {
        let title = title.into();

        if width == 0 || height == 0 {
            return Err(Error::WindowInitFailed(format!(
                "window size must be non-zero, got {width}x{height}"
            )));
        }
        if title.trim().is_empty() {
            return Err(Error::WindowInitFailed("window title is empty".into()));
        }

        Ok(Self {
            width,
            height,
            title,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height))
            .with_resizable(false)
    }
}

/// Opens the window and binds a graphics context to it.
///
/// Must run inside a live event loop (`resumed`). If context creation fails
/// the window is dropped before returning.
pub(crate) fn create_entry(
    event_loop: &ActiveEventLoop,
    spec: &WindowSpec,
    init: &GpuInit,
) -> Result<WindowEntry, Error> {
    let window = event_loop
        .create_window(spec.attributes())
        .map_err(|e| Error::WindowInitFailed(e.to_string()))?;

    log::info!(
        "window \"{}\" created ({}x{})",
        spec.title,
        spec.width,
        spec.height
    );

    WindowEntryTryBuilder {
        window,
        gfx_builder: |window| {
            pollster::block_on(Gpu::new(window, init.clone()))
                .map(|gpu| Gfx::new(gpu, init.debug_mode))
                .map_err(|e| Error::ContextCreationFailed(format!("{e:#}")))
        },
    }
    .try_build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_request() {
        let spec = WindowSpec::new(1366, 768, "demo").unwrap();
        assert_eq!((spec.width(), spec.height()), (1366, 768));
        assert_eq!(spec.title(), "demo");
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            WindowSpec::new(0, 768, "demo"),
            Err(Error::WindowInitFailed(_))
        ));
        assert!(matches!(
            WindowSpec::new(1366, 0, "demo"),
            Err(Error::WindowInitFailed(_))
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(matches!(
            WindowSpec::new(800, 600, ""),
            Err(Error::WindowInitFailed(_))
        ));
        assert!(matches!(
            WindowSpec::new(800, 600, "   "),
            Err(Error::WindowInitFailed(_))
        ));
    }
}
