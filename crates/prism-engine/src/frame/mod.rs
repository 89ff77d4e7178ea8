//! Frame loop controller.
//!
//! One contract, two drivers: `window::PollPlatform` pumps events itself and
//! calls `FrameLoop::run`; `window::Runtime` lets winit call back into
//! `FrameLoop::iterate` on every redraw.

mod controller;

pub use controller::{FrameHost, FrameLoop, LoopState, LoopSummary, Scene};
