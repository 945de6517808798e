use crate::audio::backend::AudioHandle;
use crate::foundation::core::unit_gain;

/// Ramp phase of a [`Fade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    /// Ramping from silence up to the target volume.
    In,
    /// Holding at the target volume.
    Playing,
    /// Ramping from the captured start volume down to silence.
    Out,
}

/// A handle under a linear, time-based volume ramp.
///
/// Times are host clock seconds. The only side effects are play/pause/volume calls on the handle.
#[derive(Debug)]
pub struct Fade<H: AudioHandle> {
    handle: H,
    state: FadeState,
    start_sec: f64,
    duration_sec: f64,
    /// Target for `In`/`Playing`, start value for `Out`.
    level: f64,
}

impl<H: AudioHandle> Fade<H> {
    /// Silence the handle, start playback and begin ramping toward `target_volume`.
    pub fn fade_in(mut handle: H, target_volume: f64, duration_sec: f64, now_sec: f64) -> Self {
        handle.set_volume(0.0);
        handle.play();
        Self {
            handle,
            state: FadeState::In,
            start_sec: now_sec,
            duration_sec,
            level: unit_gain(target_volume),
        }
    }

    /// Begin ramping down from the handle's current volume.
    pub fn fade_out(self, duration_sec: f64, now_sec: f64) -> Self {
        let start = unit_gain(self.handle.volume());
        Self {
            state: FadeState::Out,
            start_sec: now_sec,
            duration_sec,
            level: start,
            handle: self.handle,
        }
    }

    /// Advance the ramp to `now_sec`.
    ///
    /// Returns `None` once an out-fade has finished; the handle is stopped and released.
    pub fn tick(mut self, now_sec: f64) -> Option<Self> {
        let t = self.progress(now_sec);
        match self.state {
            FadeState::Playing => Some(self),
            FadeState::In => {
                self.handle.set_volume((t * self.level).clamp(0.0, self.level));
                if t >= 1.0 {
                    self.state = FadeState::Playing;
                }
                Some(self)
            }
            FadeState::Out => {
                self.handle
                    .set_volume(((1.0 - t) * self.level).clamp(0.0, self.level));
                if t >= 1.0 {
                    self.kill();
                    return None;
                }
                Some(self)
            }
        }
    }

    /// Stop and release the handle without ramping. Teardown only.
    pub fn kill(mut self) {
        self.handle.pause();
        self.handle.release();
    }

    /// Current ramp phase.
    pub fn state(&self) -> FadeState {
        self.state
    }

    /// `true` while the volume is still changing.
    pub fn is_ramping(&self) -> bool {
        self.state != FadeState::Playing
    }

    /// Borrow the underlying handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    fn progress(&self, now_sec: f64) -> f64 {
        if self.duration_sec <= 0.0 || !self.duration_sec.is_finite() {
            return 1.0;
        }
        let t = (now_sec - self.start_sec) / self.duration_sec;
        if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) }
    }
}

/// Begin an out-fade on an optional fade; an empty slot stays empty.
pub fn begin_fade_out<H: AudioHandle>(
    fade: Option<Fade<H>>,
    duration_sec: f64,
    now_sec: f64,
) -> Option<Fade<H>> {
    fade.map(|f| f.fade_out(duration_sec, now_sec))
}

/// Tick the fade held in `slot`, clearing it when the fade completes. Empty slots are a no-op.
pub fn tick_slot<H: AudioHandle>(slot: &mut Option<Fade<H>>, now_sec: f64) {
    *slot = slot.take().and_then(|f| f.tick(now_sec));
}

/// Kill the fade held in `slot`, if any.
pub fn kill_slot<H: AudioHandle>(slot: &mut Option<Fade<H>>) {
    if let Some(f) = slot.take() {
        f.kill();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/fade.rs"]
mod tests;
