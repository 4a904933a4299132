/// Player token state and the per-sample motion update.
///
/// ## Update order (one call per acceleration sample)
///
///   1. Integrate:  v += a                 (unscaled, no dt)
///   2. Propose:    p' = p + v / damping
///   3. Clamp:      keep the token inside the viewport;
///                  an axis that clamps loses its velocity
///   4. Commit:     p = p'
///
/// Collision with maze walls is NOT handled here; see `rules`.
/// The viewport edge is an inelastic "world wall"; maze walls end the run.

use super::geometry::{Point, Rect, Viewport};

/// Default damping divisor applied to velocity when moving.
pub const DEFAULT_DAMPING: f64 = 3.0;

/// One acceleration reading on the two screen axes (dimensionless).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Sample {
    pub ax: f64,
    pub ay: f64,
}

impl Sample {
    pub fn new(ax: f64, ay: f64) -> Self {
        Sample { ax, ay }
    }
}

/// Which axes were clamped against the viewport edge this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Clamped {
    pub x: bool,
    pub y: bool,
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub pos: Point,
    pub vel: Point,
    /// Half the token's width/height.
    pub half: Point,
}

impl PlayerState {
    pub fn new(pos: Point, half: Point) -> Self {
        PlayerState { pos, vel: Point::ZERO, half }
    }

    /// Bounding rectangle of the token at its current position.
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.half)
    }

    /// Put the token back at `pos` with zero velocity.
    pub fn reset(&mut self, pos: Point) {
        self.pos = pos;
        self.vel = Point::ZERO;
    }

    /// Apply one sample: integrate, move, clamp to the viewport.
    pub fn advance(&mut self, sample: Sample, damping: f64, viewport: Viewport) -> Clamped {
        self.vel.x += sample.ax;
        self.vel.y += sample.ay;

        let (x, clamp_x) = clamp_axis(self.pos.x + self.vel.x / damping, self.half.x, viewport.width);
        let (y, clamp_y) = clamp_axis(self.pos.y + self.vel.y / damping, self.half.y, viewport.height);

        if clamp_x { self.vel.x = 0.0; }
        if clamp_y { self.vel.y = 0.0; }
        self.pos = Point::new(x, y);

        Clamped { x: clamp_x, y: clamp_y }
    }
}

/// Clamp a proposed center so `[center - half, center + half]` stays in
/// `[0, extent]`. Returns the legal center and whether it moved.
///
/// A token wider than the extent is pinned to the middle.
fn clamp_axis(center: f64, half: f64, extent: f64) -> (f64, bool) {
    let lo = half;
    let hi = extent - half;
    if lo > hi {
        return (extent / 2.0, center != extent / 2.0);
    }
    if center < lo {
        (lo, true)
    } else if center > hi {
        (hi, true)
    } else {
        (center, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player_at(x: f64, y: f64) -> PlayerState {
        PlayerState::new(Point::new(x, y), Point::new(5.0, 5.0))
    }

    fn view() -> Viewport {
        Viewport::new(200.0, 200.0)
    }

    #[test]
    fn integrates_then_moves_by_damped_velocity() {
        let mut p = player_at(50.0, 50.0);
        p.advance(Sample::new(3.0, -6.0), 3.0, view());
        assert_eq!(p.vel, Point::new(3.0, -6.0));
        assert_eq!(p.pos, Point::new(51.0, 48.0));

        // Velocity accumulates across samples
        p.advance(Sample::new(3.0, 0.0), 3.0, view());
        assert_eq!(p.vel, Point::new(6.0, -6.0));
        assert_eq!(p.pos, Point::new(53.0, 46.0));
    }

    #[test]
    fn zero_sample_keeps_coasting() {
        let mut p = player_at(50.0, 50.0);
        p.vel = Point::new(6.0, 0.0);
        p.advance(Sample::default(), 3.0, view());
        assert_eq!(p.pos, Point::new(52.0, 50.0));
        assert_eq!(p.vel, Point::new(6.0, 0.0));
    }

    #[test]
    fn clamp_at_right_edge_zeroes_vx_only() {
        let mut p = player_at(190.0, 100.0);
        p.vel = Point::new(30.0, 3.0);
        let c = p.advance(Sample::default(), 3.0, view());
        assert_eq!(c, Clamped { x: true, y: false });
        assert_eq!(p.pos.x, 195.0);
        assert_eq!(p.vel.x, 0.0);
        assert_eq!(p.vel.y, 3.0);
        assert_eq!(p.pos.y, 101.0);
    }

    #[test]
    fn clamp_at_top_left_corner() {
        let mut p = player_at(6.0, 6.0);
        let c = p.advance(Sample::new(-9.0, -9.0), 3.0, view());
        assert_eq!(c, Clamped { x: true, y: true });
        assert_eq!(p.pos, Point::new(5.0, 5.0));
        assert_eq!(p.vel, Point::ZERO);
    }

    #[test]
    fn resting_on_edge_is_not_a_clamp() {
        let mut p = player_at(195.0, 100.0);
        let c = p.advance(Sample::default(), 3.0, view());
        assert_eq!(c, Clamped::default());
        assert_eq!(p.pos.x, 195.0);
    }

    #[test]
    fn reset_restores_position_and_stops() {
        let mut p = player_at(10.0, 10.0);
        p.vel = Point::new(4.0, 4.0);
        p.reset(Point::new(50.0, 50.0));
        assert_eq!(p.pos, Point::new(50.0, 50.0));
        assert_eq!(p.vel, Point::ZERO);
    }

    #[test]
    fn oversized_token_is_pinned_to_middle() {
        let mut p = PlayerState::new(Point::new(10.0, 10.0), Point::new(150.0, 5.0));
        p.advance(Sample::new(1.0, 0.0), 3.0, view());
        assert_eq!(p.pos.x, 100.0);
        assert_eq!(p.vel.x, 0.0);
    }

    proptest! {
        #[test]
        fn token_never_leaves_viewport(
            samples in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..200),
        ) {
            let v = view();
            let mut p = player_at(50.0, 50.0);
            for (ax, ay) in samples {
                let c = p.advance(Sample::new(ax, ay), DEFAULT_DAMPING, v);
                prop_assert!(p.pos.x >= p.half.x && p.pos.x <= v.width - p.half.x);
                prop_assert!(p.pos.y >= p.half.y && p.pos.y <= v.height - p.half.y);
                if c.x { prop_assert_eq!(p.vel.x, 0.0); }
                if c.y { prop_assert_eq!(p.vel.y, 0.0); }
            }
        }
    }
}
