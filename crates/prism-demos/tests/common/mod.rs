use prism_engine::device::{DebugMode, RecordingDevice};
use prism_engine::frame::FrameHost;
use prism_engine::lifecycle::Gfx;
use prism_engine::Error;

/// Headless host: a recording device and a close flag raised after a fixed
/// number of polls.
pub struct ScriptedHost {
    pub gfx: Gfx<'static>,
    polls: u64,
    close_after: Option<u64>,
}

impl ScriptedHost {
    pub fn new(device: RecordingDevice, mode: DebugMode) -> Self {
        Self {
            gfx: Gfx::new(device, mode),
            polls: 0,
            close_after: None,
        }
    }

    pub fn close_after(mut self, polls: u64) -> Self {
        self.close_after = Some(polls);
        self
    }
}

impl FrameHost for ScriptedHost {
    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn should_close(&self) -> bool {
        self.close_after.is_some_and(|n| self.polls >= n)
    }

    fn with_gfx<R>(
        &mut self,
        f: impl FnOnce(&mut Gfx<'_>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        f(&mut self.gfx)
    }
}
