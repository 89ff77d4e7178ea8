use crate::lifecycle::Gfx;
use crate::time::Tick;
use crate::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    /// Close was requested; the current iteration still completes.
    Closing,
}

/// Per-frame behavior of a demo.
pub trait Scene {
    /// Called exactly once per iteration, before `draw`.
    fn update(&mut self, dt: f32) {
        let _ = dt;
    }

    fn draw(&mut self, gfx: &mut Gfx<'_>) -> Result<(), Error>;
}

/// What the frame loop needs from the platform layer.
pub trait FrameHost {
    /// Drains pending window events without blocking.
    fn poll_events(&mut self);

    fn should_close(&self) -> bool;

    /// Runs `f` against the live graphics context.
    fn with_gfx<R>(&mut self, f: impl FnOnce(&mut Gfx<'_>) -> Result<R, Error>)
        -> Result<R, Error>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LoopSummary {
    pub frames: u64,
}

/// Drives poll → update → draw → present once per iteration.
pub struct FrameLoop<C: Tick> {
    clock: C,
    state: LoopState,
    frames: u64,
    frame_limit: Option<u64>,
}

impl<C: Tick> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: LoopState::Running,
            frames: 0,
            frame_limit: None,
        }
    }

    /// Stops after `frames` iterations as if close had been requested. 0 means no limit.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = (frames > 0).then_some(frames);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one iteration and returns the state it ended in.
    ///
    /// Present is issued whenever draw was attempted, even if draw failed;
    /// the draw error then takes precedence. Once `Closing` has been
    /// returned further calls do nothing.
    pub fn iterate<H, S>(&mut self, host: &mut H, scene: &mut S) -> Result<LoopState, Error>
    where
        H: FrameHost,
        S: Scene,
    {
        if self.state == LoopState::Closing {
            return Ok(LoopState::Closing);
        }

        host.poll_events();

        let limit_reached = self.frame_limit.is_some_and(|n| self.frames + 1 >= n);
        if host.should_close() || limit_reached {
            log::debug!("close requested after {} frames", self.frames);
            self.state = LoopState::Closing;
        }

        let ft = self.clock.tick();
        scene.update(ft.dt);

        host.with_gfx(|gfx| {
            let drawn = scene.draw(gfx);
            let presented = gfx.present();
            drawn.and(presented)
        })?;

        self.frames += 1;
        Ok(self.state)
    }

    /// Iterates until an iteration observes `Closing`.
    pub fn run<H, S>(&mut self, host: &mut H, scene: &mut S) -> Result<LoopSummary, Error>
    where
        H: FrameHost,
        S: Scene,
    {
        while self.iterate(host, scene)? == LoopState::Running {}

        Ok(LoopSummary {
            frames: self.frames,
        })
    }
}
