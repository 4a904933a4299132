/// Session: the complete state of one maze run.
///
/// ## Layers
///
///   - `maze`, `geometry`, `walls`, `goal`: built once in `new()`,
///     **never mutated** afterwards.
///   - `player`, `state`, `attempt`, `tick`: the only mutable state.
///
/// ## State machine
///
///   Running ──(wall)──▶ Lost ──┐
///      ▲                       │ retry()
///      └──(goal)──▶ Won  ──────┘
///
/// Lost and Won are terminal: `apply_sample()` is a no-op there.
/// `retry()` while Running is a no-op as well.

use crate::domain::geometry::{GridGeometry, Point, Rect, Viewport};
use crate::domain::motion::{PlayerState, Sample, DEFAULT_DAMPING};
use crate::domain::rules::{self, Arena, Outcome, WallPolicy};
use super::event::GameEvent;
use super::maze::MazeGrid;

/// Token is `cell / DEFAULT_TOKEN_DIVISOR` on each axis.
pub const DEFAULT_TOKEN_DIVISOR: f64 = 6.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Running,
    Lost,
    Won,
}

impl SessionState {
    pub fn is_running(self) -> bool {
        self == SessionState::Running
    }
}

impl From<Outcome> for SessionState {
    fn from(o: Outcome) -> Self {
        match o {
            Outcome::Lost => SessionState::Lost,
            Outcome::Won => SessionState::Won,
        }
    }
}

/// Physics and rule knobs for a session.
#[derive(Clone, Copy, Debug)]
pub struct Tuning {
    pub damping: f64,
    pub token_divisor: f64,
    pub wall_policy: WallPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            damping: DEFAULT_DAMPING,
            token_divisor: DEFAULT_TOKEN_DIVISOR,
            wall_policy: WallPolicy::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    maze: MazeGrid,
    geometry: GridGeometry,
    viewport: Viewport,
    tuning: Tuning,
    walls: Vec<Rect>,
    goal: Rect,
    spawn: Point,

    pub player: PlayerState,
    state: SessionState,
    /// Play-through number, starting at 1.
    attempt: u32,
    /// Samples applied in the current play-through.
    tick: u64,
}

impl Session {
    /// Lay the maze out over `viewport` and put the token on the start cell.
    ///
    /// Panics if the viewport is degenerate or the tuning values are not
    /// positive; callers sanitize configuration before getting here.
    pub fn new(maze: MazeGrid, viewport: Viewport, tuning: Tuning) -> Self {
        assert!(tuning.damping > 0.0, "damping must be positive");
        assert!(tuning.token_divisor > 0.0, "token divisor must be positive");

        let geometry = GridGeometry::new(maze.width, maze.height, viewport);
        let walls: Vec<Rect> = maze.iter()
            .filter(|&(_, _, kind)| kind.is_wall())
            .map(|(x, y, _)| geometry.cell_rect(x, y))
            .collect();
        let goal = geometry.cell_rect(maze.goal.0, maze.goal.1);
        let spawn = geometry.cell_center(maze.start.0, maze.start.1);
        let half = Point::new(
            geometry.cell_w / tuning.token_divisor / 2.0,
            geometry.cell_h / tuning.token_divisor / 2.0,
        );

        Session {
            maze,
            geometry,
            viewport,
            tuning,
            walls,
            goal,
            spawn,
            player: PlayerState::new(spawn, half),
            state: SessionState::Running,
            attempt: 1,
            tick: 0,
        }
    }

    /// Advance one sample: move the token, then check walls and goal.
    /// Returns the events of this tick; empty when not Running.
    pub fn apply_sample(&mut self, sample: Sample) -> Vec<GameEvent> {
        if !self.state.is_running() { return vec![]; }

        let mut events = Vec::new();
        self.tick += 1;

        let clamped = self.player.advance(sample, self.tuning.damping, self.viewport);
        if clamped.x || clamped.y {
            events.push(GameEvent::EdgeBump);
        }

        let arena = Arena {
            walls: &self.walls,
            goal: self.goal,
            policy: self.tuning.wall_policy,
        };
        if let Some(outcome) = rules::evaluate(&arena, &self.player.rect()) {
            self.state = outcome.into();
            log::info!(
                "attempt {} ended: {:?} after {} samples at ({:.1}, {:.1})",
                self.attempt, outcome, self.tick, self.player.pos.x, self.player.pos.y,
            );
            events.push(GameEvent::ended(outcome));
        }

        events
    }

    /// Start a new play-through from Lost/Won. Returns `false` (and changes
    /// nothing) while Running.
    pub fn retry(&mut self) -> bool {
        if self.state.is_running() { return false; }
        self.player.reset(self.spawn);
        self.state = SessionState::Running;
        self.attempt += 1;
        self.tick = 0;
        log::info!("retry: attempt {}", self.attempt);
        true
    }

    // ── Queries ──

    pub fn state(&self) -> SessionState { self.state }
    pub fn attempt(&self) -> u32 { self.attempt }
    pub fn tick(&self) -> u64 { self.tick }
    pub fn maze(&self) -> &MazeGrid { &self.maze }
    pub fn geometry(&self) -> &GridGeometry { &self.geometry }
    pub fn viewport(&self) -> Viewport { self.viewport }
    pub fn walls(&self) -> &[Rect] { &self.walls }
    pub fn goal_rect(&self) -> Rect { self.goal }
}
