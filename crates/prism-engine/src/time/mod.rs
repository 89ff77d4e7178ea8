//! Frame timing.
//!
//! - `FrameClock` follows the wall clock, one per render loop
//! - `FixedClock` yields a constant delta for deterministic runs and tests

mod frame_clock;

pub use frame_clock::{FixedClock, FrameClock, FrameTime, Tick};
