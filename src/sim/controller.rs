/// Game session controller: ties the session to its motion subscription.
///
///   - A terminal transition stops the sampler in the same tick, so no
///     further samples are consumed while the result is on screen.
///   - `retry()` restarts the play-through and resumes the sampler if it
///     was stopped.

use std::time::{Duration, Instant};

use super::event::GameEvent;
use super::sampler::{MotionSampler, MotionSource};
use super::session::Session;

pub struct GameController {
    session: Session,
    sampler: MotionSampler,
}

impl GameController {
    /// Wrap a session and subscribe to motion at `interval`, starting `now`.
    pub fn new(session: Session, interval: Duration, now: Instant) -> Self {
        let mut sampler = MotionSampler::new(interval);
        sampler.start(now);
        GameController { session, sampler }
    }

    /// Per-frame entry point: apply a sample if one is due.
    pub fn tick<S: MotionSource + ?Sized>(&mut self, now: Instant, source: &mut S) -> Vec<GameEvent> {
        let sample = match self.sampler.poll(now, source) {
            Some(s) => s,
            None => return vec![],
        };

        let events = self.session.apply_sample(sample);
        if !self.session.state().is_running() && self.sampler.is_active() {
            self.sampler.stop();
            log::debug!("motion sampling paused");
        }
        events
    }

    /// Retry command from the result dialog. No-op while Running.
    pub fn retry(&mut self, now: Instant) -> Vec<GameEvent> {
        if !self.session.retry() {
            return vec![];
        }
        if !self.sampler.is_active() {
            self.sampler.start(now);
            log::debug!("motion sampling resumed");
        }
        vec![GameEvent::Retried { attempt: self.session.attempt() }]
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Play time of the current attempt, counted in applied samples.
    pub fn elapsed(&self) -> Duration {
        self.sampler.interval() * self.session.tick().min(u32::MAX as u64) as u32
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_active()
    }
}
