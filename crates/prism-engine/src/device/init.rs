use super::DebugMode;

/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the API bindings may use. `GL` gives the classic OpenGL path.
    pub backends: wgpu::Backends,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is vsync and supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Limits requested from the adapter/device.
    ///
    /// The demos only need downlevel limits, which GL adapters satisfy.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface. A hint only.
    pub desired_maximum_frame_latency: u32,

    /// Handling of errors reported through the debug callback.
    pub debug_mode: DebugMode,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            required_limits: wgpu::Limits::downlevel_defaults(),
            desired_maximum_frame_latency: 2,
            debug_mode: DebugMode::default(),
        }
    }
}

/// Parses a backend selector such as `gl`, `vulkan` or `primary`.
pub fn parse_backends(value: &str) -> Option<wgpu::Backends> {
    let backends = match value.trim().to_ascii_lowercase().as_str() {
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "primary" => wgpu::Backends::PRIMARY,
        "all" => wgpu::Backends::all(),
        _ => return None,
    };
    Some(backends)
}
