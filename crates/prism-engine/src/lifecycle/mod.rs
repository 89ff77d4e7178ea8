//! Ownership and ordered release of device objects.

mod gfx;
mod resources;

pub use gfx::Gfx;
pub use resources::ResourceSet;
