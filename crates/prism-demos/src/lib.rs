//! The two prism demos: a static colored triangle and a rotating,
//! depth-tested cube. Binaries live in `src/bin`; scenes are exposed here so
//! tests can drive them against a recording device.

pub mod cube;
pub mod launch;
pub mod shaders;
pub mod triangle;
