//! Window + context bootstrap and the two loop drivers.
//!
//! - `PollPlatform`: caller-owned loop, events pumped with a zero timeout
//! - `Runtime`: winit-owned loop, one frame per `RedrawRequested`

mod bootstrap;
mod entry;
#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "android",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
mod poll;
mod runtime;

pub use bootstrap::WindowSpec;
#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "android",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub use poll::PollPlatform;
pub use runtime::{Runtime, RuntimeConfig};

/// Opens a `width`x`height` window titled `title` with default GPU settings.
#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "android",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub fn initialize(width: u32, height: u32, title: &str) -> Result<PollPlatform, crate::Error> {
    PollPlatform::initialize(&RuntimeConfig {
        title: title.to_string(),
        width,
        height,
        ..RuntimeConfig::default()
    })
}
