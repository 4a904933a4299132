/// Geometry mapper: grid coordinates → viewport rectangles.
///
/// ## Coordinate system
///
/// Viewport coordinates are floating-point "points" with the origin at the
/// top-left corner, x growing right and y growing down. The viewport size is
/// always passed in explicitly; nothing here reads the terminal.
///
/// Cells tile the viewport exactly:
///   cell_w = width / cols,  cell_h = height / rows
///   center(x, y) = (cell_w/2 + x·cell_w, cell_h/2 + y·cell_h)

/// A point (or a vector) in viewport coordinates.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Viewport extent in points.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
            && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned closed rectangle `[min_x, max_x] × [min_y, max_y]`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Build from a center and per-axis half-extents.
    pub fn from_center(center: Point, half: Point) -> Self {
        Rect {
            min_x: center.x - half.x,
            min_y: center.y - half.y,
            max_x: center.x + half.x,
            max_y: center.y + half.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Is `inner` fully inside this rectangle? Shared edges count as inside.
    pub fn contains(&self, inner: &Rect) -> bool {
        inner.min_x >= self.min_x && inner.max_x <= self.max_x
            && inner.min_y >= self.min_y && inner.max_y <= self.max_y
    }

    /// Do the two rectangles overlap with positive area?
    /// Rectangles that only share an edge or a corner do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x < other.max_x && other.min_x < self.max_x
            && self.min_y < other.max_y && other.min_y < self.max_y
    }
}

/// Cell layout for a `cols × rows` grid stretched over a viewport.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GridGeometry {
    pub cols: usize,
    pub rows: usize,
    pub cell_w: f64,
    pub cell_h: f64,
}

impl GridGeometry {
    /// Panics on an empty grid or a degenerate viewport: both are
    /// construction-time programming errors, never runtime input.
    pub fn new(cols: usize, rows: usize, viewport: Viewport) -> Self {
        assert!(cols > 0 && rows > 0, "grid must have at least one row and column");
        assert!(viewport.is_valid(), "viewport must have a positive finite size");
        GridGeometry {
            cols,
            rows,
            cell_w: viewport.width / cols as f64,
            cell_h: viewport.height / rows as f64,
        }
    }

    pub fn cell_center(&self, x: usize, y: usize) -> Point {
        Point::new(
            self.cell_w / 2.0 + x as f64 * self.cell_w,
            self.cell_h / 2.0 + y as f64 * self.cell_h,
        )
    }

    pub fn cell_rect(&self, x: usize, y: usize) -> Rect {
        Rect::from_center(
            self.cell_center(x, y),
            Point::new(self.cell_w / 2.0, self.cell_h / 2.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── Grid mapping ──

    #[test]
    fn cell_size_divides_viewport() {
        let g = GridGeometry::new(6, 10, Viewport::new(360.0, 600.0));
        assert!(approx(g.cell_w, 60.0));
        assert!(approx(g.cell_h, 60.0));
    }

    #[test]
    fn cell_centers_follow_formula() {
        let g = GridGeometry::new(2, 2, Viewport::new(200.0, 200.0));
        assert_eq!(g.cell_center(0, 0), Point::new(50.0, 50.0));
        assert_eq!(g.cell_center(1, 0), Point::new(150.0, 50.0));
        assert_eq!(g.cell_center(1, 1), Point::new(150.0, 150.0));
    }

    #[test]
    fn cells_tile_without_gaps() {
        let g = GridGeometry::new(3, 7, Viewport::new(301.0, 433.0));
        for y in 0..g.rows {
            for x in 0..g.cols {
                let r = g.cell_rect(x, y);
                if x + 1 < g.cols {
                    assert!(approx(r.max_x, g.cell_rect(x + 1, y).min_x));
                }
                if y + 1 < g.rows {
                    assert!(approx(r.max_y, g.cell_rect(x, y + 1).min_y));
                }
            }
        }
        let last = g.cell_rect(g.cols - 1, g.rows - 1);
        assert!(approx(last.max_x, 301.0));
        assert!(approx(last.max_y, 433.0));
        assert!(approx(g.cell_rect(0, 0).min_x, 0.0));
    }

    #[test]
    #[should_panic]
    fn empty_grid_is_rejected() {
        GridGeometry::new(0, 3, Viewport::new(100.0, 100.0));
    }

    #[test]
    #[should_panic]
    fn zero_viewport_is_rejected() {
        GridGeometry::new(2, 2, Viewport::new(0.0, 100.0));
    }

    // ── Rectangle predicates ──

    #[test]
    fn contains_is_closed() {
        let outer = Rect { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Rect { min_x: 2.0, min_y: 2.0, max_x: 4.0, max_y: 4.0 }));
        assert!(!outer.contains(&Rect { min_x: 8.0, min_y: 2.0, max_x: 11.0, max_y: 4.0 }));
    }

    #[test]
    fn intersects_requires_overlap() {
        let a = Rect { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        let touching = Rect { min_x: 10.0, min_y: 0.0, max_x: 20.0, max_y: 10.0 };
        let overlapping = Rect { min_x: 9.0, min_y: 9.0, max_x: 20.0, max_y: 20.0 };
        let apart = Rect { min_x: 11.0, min_y: 0.0, max_x: 20.0, max_y: 10.0 };
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn from_center_round_trips_center() {
        let r = Rect::from_center(Point::new(50.0, 60.0), Point::new(5.0, 7.0));
        assert_eq!(r.center(), Point::new(50.0, 60.0));
        assert!(approx(r.width(), 10.0));
        assert!(approx(r.height(), 14.0));
    }
}
