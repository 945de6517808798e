use std::collections::BTreeMap;

/// Id of one scheduled wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRequest(pub u64);

/// Host repaint primitive: "call me before the next frame" plus a matching cancel.
///
/// The scheduler never calls back by itself; the host delivers each fired request to
/// `PlayheadController::on_frame`.
pub trait FrameScheduler {
    /// Wake on the next repaint.
    fn request_frame(&mut self) -> FrameRequest;
    /// Wake once `delay_sec` has elapsed.
    fn request_delay(&mut self, delay_sec: f64) -> FrameRequest;
    /// Drop a request that has not fired yet. Unknown or fired requests are ignored.
    fn cancel(&mut self, request: FrameRequest);
}

/// Deterministic scheduler driven by an explicit clock, for tests and headless simulation.
///
/// Requests fire from [`ManualScheduler::advance`] in id order. A frame request made at time `t`
/// fires on the first advance to `t` or later that starts after it was made.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now_sec: f64,
    next_id: u64,
    pending: BTreeMap<FrameRequest, f64>,
}

impl ManualScheduler {
    /// Scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock.
    pub fn now_sec(&self) -> f64 {
        self.now_sec
    }

    /// Number of requests waiting to fire.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock to `now_sec` and take every request that is due.
    ///
    /// The clock never moves backwards.
    pub fn advance(&mut self, now_sec: f64) -> Vec<FrameRequest> {
        if now_sec > self.now_sec {
            self.now_sec = now_sec;
        }
        let due: Vec<FrameRequest> = self
            .pending
            .iter()
            .filter(|&(_, &at)| at <= self.now_sec)
            .map(|(&r, _)| r)
            .collect();
        for r in &due {
            self.pending.remove(r);
        }
        due
    }

    fn push(&mut self, at_sec: f64) -> FrameRequest {
        let r = FrameRequest(self.next_id);
        self.next_id += 1;
        self.pending.insert(r, at_sec);
        r
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.push(self.now_sec)
    }

    fn request_delay(&mut self, delay_sec: f64) -> FrameRequest {
        let delay = if delay_sec.is_finite() { delay_sec.max(0.0) } else { 0.0 };
        self.push(self.now_sec + delay)
    }

    fn cancel(&mut self, request: FrameRequest) {
        self.pending.remove(&request);
    }
}
