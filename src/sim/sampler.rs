/// Motion sampler: a fixed-rate subscription to an acceleration source.
///
/// The sampler only decides WHEN a sample is due; the source decides WHAT
/// the current acceleration is. The game loop calls `poll()` every frame:
///
///   - stopped          → never yields
///   - interval not up  → yields nothing
///   - interval up      → reads the source once and re-arms
///
/// Late frames are not caught up: one poll yields at most one sample.
/// `start()` re-arms from the given instant, so a resumed subscription
/// never delivers a burst of stale samples.

use std::time::{Duration, Instant};

use crate::domain::motion::Sample;

/// Anything that can report the current 2-axis acceleration.
pub trait MotionSource {
    fn read(&mut self) -> Sample;
}

/// Fixed queue of readings, then zeros.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct ScriptedMotion {
    queue: std::collections::VecDeque<Sample>,
}

#[cfg(test)]
impl ScriptedMotion {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        ScriptedMotion { queue: samples.into_iter().collect() }
    }

    /// The same reading `n` times.
    pub fn repeat(sample: Sample, n: usize) -> Self {
        ScriptedMotion::new(std::iter::repeat(sample).take(n))
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
impl MotionSource for ScriptedMotion {
    fn read(&mut self) -> Sample {
        self.queue.pop_front().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct MotionSampler {
    interval: Duration,
    /// `Some(next due instant)` while subscribed.
    next_due: Option<Instant>,
}

impl MotionSampler {
    /// New sampler, initially stopped. A zero interval is bumped to 1 ms.
    pub fn new(interval: Duration) -> Self {
        MotionSampler {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Subscribe. The first sample is due one interval after `now`.
    /// Restarting an active sampler re-arms it.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Unsubscribe. No samples are delivered until the next `start()`.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Deliver at most one sample if one is due at `now`.
    pub fn poll<S: MotionSource + ?Sized>(&mut self, now: Instant, source: &mut S) -> Option<Sample> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        // Re-arm from now, not from `due`: a stalled frame must not
        // turn into several samples at once.
        self.next_due = Some(now + self.interval);
        Some(source.read())
    }
}
