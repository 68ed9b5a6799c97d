use std::time::{Duration, Instant};

/// Coarse progress of one relaxation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// 1-based attempt number within the search.
    pub attempt: u64,
    /// Completed macro-cycles in this attempt.
    pub cycle: usize,
    /// Largest unclamped force magnitude seen in the last micro-step.
    pub max_force: f64,
}

/// Receives throttled progress updates. Purely observational.
pub trait ProgressSink {
    fn progress(&mut self, update: &Progress);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&mut self, _update: &Progress) {}
}

impl<F: FnMut(&Progress)> ProgressSink for F {
    fn progress(&mut self, update: &Progress) {
        self(update)
    }
}

/// Lets an event through at most once per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True when the caller should emit now. The first call always passes.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    fn ready_at(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
