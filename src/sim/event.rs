/// Events emitted by the session.
/// The presentation layer consumes these for the result overlay and sound.

use crate::domain::rules::Outcome;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Token hit the viewport edge this tick (at least one axis clamped).
    EdgeBump,
    /// Play-through is over. Sampling has stopped until a retry.
    Ended { outcome: Outcome, title: &'static str, message: &'static str },
    /// Token is back on the start cell and sampling resumed.
    Retried { attempt: u32 },
}

impl GameEvent {
    pub fn ended(outcome: Outcome) -> Self {
        GameEvent::Ended {
            outcome,
            title: outcome.title(),
            message: outcome.message(),
        }
    }
}
