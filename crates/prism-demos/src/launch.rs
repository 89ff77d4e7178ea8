use anyhow::{Context, Result};

use prism_engine::config::{DemoConfig, LoopMode};
use prism_engine::frame::{LoopSummary, Scene};
use prism_engine::lifecycle::Gfx;
use prism_engine::shader::ShaderLibrary;
use prism_engine::time::FrameClock;
use prism_engine::window::{Runtime, RuntimeConfig};
use prism_engine::Error;

use crate::shaders;

/// Opens the demo window, loads the scene and runs it until closed.
///
/// `PRISM_*` environment variables pick the loop driver, backend, debug mode,
/// shader directory and an optional frame limit.
pub fn run<S, L>(title: &str, width: u32, height: u32, load: L) -> Result<LoopSummary>
where
    S: Scene,
    L: FnOnce(&mut Gfx<'_>, &ShaderLibrary) -> Result<S, Error>,
{
    let config = DemoConfig::from_env().context("invalid PRISM_* environment")?;
    let shaders = shaders::library(config.shader_dir.as_deref());
    let runtime = config.runtime_config(title, width, height);

    log::info!(
        "starting \"{title}\" ({:?} loop, {:?} debug output)",
        config.loop_mode,
        runtime.gpu.debug_mode
    );

    let summary = match config.loop_mode {
        LoopMode::Poll => run_polling(&runtime, &shaders, load)?,
        LoopMode::Callback => Runtime::run(runtime, FrameClock::new(), |gfx| load(gfx, &shaders))?,
    };

    log::info!("\"{title}\" closed after {} frames", summary.frames);
    Ok(summary)
}

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
fn run_polling<S, L>(runtime: &RuntimeConfig, shaders: &ShaderLibrary, load: L) -> Result<LoopSummary>
where
    S: Scene,
    L: FnOnce(&mut Gfx<'_>, &ShaderLibrary) -> Result<S, Error>,
{
    use prism_engine::frame::FrameLoop;
    use prism_engine::window::PollPlatform;

    let mut platform = PollPlatform::initialize(runtime).context("failed to open the demo window")?;
    let mut scene = platform
        .load(|gfx| load(gfx, shaders))
        .context("failed to set up GPU resources")?;

    // Setup time is not part of the first frame.
    let mut clock = FrameClock::new();
    clock.reset();

    let result = FrameLoop::new(clock)
        .with_frame_limit(runtime.frame_limit)
        .run(&mut platform, &mut scene);

    drop(scene);
    platform.teardown();

    result.context("frame loop aborted")
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "android",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn run_polling<S, L>(runtime: &RuntimeConfig, shaders: &ShaderLibrary, load: L) -> Result<LoopSummary>
where
    S: Scene,
    L: FnOnce(&mut Gfx<'_>, &ShaderLibrary) -> Result<S, Error>,
{
    log::warn!("polling loop is unavailable on this platform; using the callback loop");
    Runtime::run(runtime.clone(), FrameClock::new(), |gfx| load(gfx, shaders))
}
