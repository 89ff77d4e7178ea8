use ouroboros::self_referencing;
use winit::window::Window;

use crate::lifecycle::Gfx;

/// A window and the graphics context that borrows it.
///
/// Fields drop in reverse: the context (and every object it tracks) goes
/// first, then the window.
#[self_referencing(pub_extras)]
pub(crate) struct WindowEntry {
    pub(crate) window: Window,

    #[borrows(window)]
    #[not_covariant]
    pub(crate) gfx: Gfx<'this>,
}
