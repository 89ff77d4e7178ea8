use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::api::DeviceError;
use super::GpuInit;

/// The window surface plus the configuration it was last configured with.
///
/// `size` tracks the latest requested drawable size, which may be 0x0 while
/// the window is minimized; `config` keeps the last size wgpu accepted.
pub(crate) struct Swapchain<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> Swapchain<'w> {
    pub(crate) fn new(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!("surface configured: {format:?} {}x{}", size.width, size.height);

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub(crate) fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.config.width,
            height: self.config.height,
            depth_or_array_layers: 1,
        }
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.size = PhysicalSize::new(width, height);
        if drawable(self.size) {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(device, &self.config);
        }
    }

    /// Next frame's texture. `Ok(None)` means skip this frame.
    pub(crate) fn acquire(
        &mut self,
        device: &wgpu::Device,
    ) -> Result<Option<wgpu::SurfaceTexture>, DeviceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(err) => {
                log::debug!("surface error: {err}");
                match recovery(&err) {
                    Recovery::Reconfigure => {
                        if drawable(self.size) {
                            self.surface.configure(device, &self.config);
                        }
                        Ok(None)
                    }
                    Recovery::Skip => Ok(None),
                    Recovery::Fatal => Err(DeviceError::SurfaceLost),
                }
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Recovery {
    Reconfigure,
    Skip,
    Fatal,
}

fn recovery(err: &wgpu::SurfaceError) -> Recovery {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Recovery::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => Recovery::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Recovery::Skip,
    }
}

fn drawable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| f.is_srgb());
    match srgb {
        Some(f) if prefer_srgb => Some(f),
        _ => formats.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn srgb_preferred_when_available() {
        let formats = [F::Bgra8Unorm, F::Bgra8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(F::Bgra8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(F::Bgra8Unorm));
        assert_eq!(pick_format(&[F::Rgba8Unorm], true), Some(F::Rgba8Unorm));
        assert_eq!(pick_format(&[], true), None);
    }

    #[test]
    fn only_oom_is_fatal() {
        assert_eq!(recovery(&wgpu::SurfaceError::Lost), Recovery::Reconfigure);
        assert_eq!(recovery(&wgpu::SurfaceError::Outdated), Recovery::Reconfigure);
        assert_eq!(recovery(&wgpu::SurfaceError::Timeout), Recovery::Skip);
        assert_eq!(recovery(&wgpu::SurfaceError::OutOfMemory), Recovery::Fatal);
    }

    #[test]
    fn zero_sized_is_not_drawable() {
        assert!(!drawable(PhysicalSize::new(0, 768)));
        assert!(drawable(PhysicalSize::new(1, 1)));
    }
}
