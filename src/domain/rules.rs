/// Win / loss evaluation against the maze.
///
/// Evaluation order is fixed: walls first, then the goal. A token that
/// satisfies both predicates in the same tick has crashed.

use super::geometry::Rect;

/// How strictly a wall must be hit to count as a crash.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallPolicy {
    /// The token must lie fully inside a wall cell. Allows grazing.
    Contain,
    /// Any positive-area overlap with a wall cell is a crash.
    Intersect,
}

impl WallPolicy {
    pub fn from_name(s: &str) -> Option<WallPolicy> {
        match s.trim().to_lowercase().as_str() {
            "contain" | "containment" | "strict" => Some(WallPolicy::Contain),
            "intersect" | "intersection" | "touch" => Some(WallPolicy::Intersect),
            _ => None,
        }
    }

    fn hits(self, wall: &Rect, token: &Rect) -> bool {
        match self {
            WallPolicy::Contain => wall.contains(token),
            WallPolicy::Intersect => wall.intersects(token),
        }
    }
}

impl Default for WallPolicy {
    fn default() -> Self {
        WallPolicy::Contain
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Lost,
    Won,
}

impl Outcome {
    pub fn title(self) -> &'static str {
        match self {
            Outcome::Lost => "GAME OVER",
            Outcome::Won => "CLEAR",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Lost => "Crashed into a wall!",
            Outcome::Won => "You win!",
        }
    }
}

/// Borrowed view of the collision geometry of one maze.
pub struct Arena<'a> {
    pub walls: &'a [Rect],
    pub goal: Rect,
    pub policy: WallPolicy,
}

/// Does the token end the run this tick? `None` = keep playing.
pub fn evaluate(arena: &Arena, token: &Rect) -> Option<Outcome> {
    if arena.walls.iter().any(|w| arena.policy.hits(w, token)) {
        Some(Outcome::Lost)
    } else if arena.goal.intersects(token) {
        Some(Outcome::Won)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Point;

    fn cell(x: f64, y: f64) -> Rect {
        // 100×100 cell whose top-left is (x, y)
        Rect { min_x: x, min_y: y, max_x: x + 100.0, max_y: y + 100.0 }
    }

    fn token(x: f64, y: f64) -> Rect {
        Rect::from_center(Point::new(x, y), Point::new(5.0, 5.0))
    }

    fn arena(walls: &[Rect], goal: Rect, policy: WallPolicy) -> Arena<'_> {
        Arena { walls, goal, policy }
    }

    // ── Walls ──

    #[test]
    fn contain_policy_allows_grazing() {
        let walls = [cell(100.0, 0.0)];
        let a = arena(&walls, cell(100.0, 100.0), WallPolicy::Contain);
        // straddles the wall's left edge
        assert_eq!(evaluate(&a, &token(100.0, 50.0)), None);
        // fully inside
        assert_eq!(evaluate(&a, &token(120.0, 50.0)), Some(Outcome::Lost));
    }

    #[test]
    fn intersect_policy_crashes_on_overlap() {
        let walls = [cell(100.0, 0.0)];
        let a = arena(&walls, cell(100.0, 100.0), WallPolicy::Intersect);
        assert_eq!(evaluate(&a, &token(100.0, 50.0)), Some(Outcome::Lost));
        // touching the edge only
        assert_eq!(evaluate(&a, &token(95.0, 50.0)), None);
    }

    #[test]
    fn any_wall_counts() {
        let walls = [cell(100.0, 0.0), cell(0.0, 100.0)];
        let a = arena(&walls, cell(100.0, 100.0), WallPolicy::Contain);
        assert_eq!(evaluate(&a, &token(50.0, 150.0)), Some(Outcome::Lost));
    }

    // ── Goal ──

    #[test]
    fn goal_wins_on_overlap() {
        let a = arena(&[], cell(0.0, 100.0), WallPolicy::Contain);
        assert_eq!(evaluate(&a, &token(50.0, 94.0)), None);
        assert_eq!(evaluate(&a, &token(50.0, 96.0)), Some(Outcome::Won));
    }

    // ── Ordering ──

    #[test]
    fn wall_beats_goal_in_same_tick() {
        // Token straddles the wall/goal boundary at y = 100.
        let walls = [cell(0.0, 0.0)];
        let a = arena(&walls, cell(0.0, 100.0), WallPolicy::Intersect);
        assert_eq!(evaluate(&a, &token(50.0, 100.0)), Some(Outcome::Lost));
    }

    #[test]
    fn wall_beats_goal_when_both_contain() {
        // Overlapping wall and goal geometry: both predicates hold.
        let walls = [cell(0.0, 0.0)];
        let a = arena(&walls, cell(0.0, 0.0), WallPolicy::Contain);
        assert_eq!(evaluate(&a, &token(50.0, 50.0)), Some(Outcome::Lost));
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(WallPolicy::from_name("contain"), Some(WallPolicy::Contain));
        assert_eq!(WallPolicy::from_name(" Intersect "), Some(WallPolicy::Intersect));
        assert_eq!(WallPolicy::from_name("bounce"), None);
    }

    #[test]
    fn outcome_texts() {
        assert!(Outcome::Lost.message().contains("wall"));
        assert_eq!(Outcome::Won.title(), "CLEAR");
    }
}
