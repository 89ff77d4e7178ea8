//! Prism engine crate.
//!
//! Owns the pieces every demo shares: window + GPU context bootstrap, shader
//! program building, geometry upload, the frame loop and deterministic
//! teardown of GPU objects.

pub mod config;
pub mod device;
pub mod frame;
pub mod geometry;
pub mod lifecycle;
pub mod logging;
pub mod shader;
pub mod time;
pub mod transform;
pub mod window;

mod error;

pub use error::Error;
