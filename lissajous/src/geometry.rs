//! Core geometry types for plotting.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = lets you print with `{:?}`
//! - `Clone` / `Copy` = can duplicate the value (Copy for small stack values only)
//! - `PartialEq` = can compare with `==`

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A run of connected points, drawn as one `<polyline>`.
pub type Polyline = Vec<Point>;

/// Axis-aligned bounding box of a data set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A pixel rectangle inside an SVG document (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Bounding box of all finite points, or `None` if there are none.
    ///
    /// ## Rust Lesson #8: Iterator folding
    ///
    /// `fold` threads an accumulator through the iterator - here an
    /// `Option<Bounds>` that starts empty and grows with every point.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        points
            .into_iter()
            .filter(Point::is_finite)
            .fold(None, |acc: Option<Bounds>, p| match acc {
                None => Some(Bounds::new(p.x, p.y, p.x, p.y)),
                Some(b) => Some(Bounds::new(
                    b.min_x.min(p.x),
                    b.min_y.min(p.y),
                    b.max_x.max(p.x),
                    b.max_y.max(p.y),
                )),
            })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Grow a flat axis to a unit span, then pad both axes by `fraction`.
    ///
    /// A zero-amplitude signal has zero height; without this the plot
    /// transform would divide by zero.
    pub fn padded(&self, fraction: f64) -> Bounds {
        let (min_x, max_x) = widen(self.min_x, self.max_x);
        let (min_y, max_y) = widen(self.min_y, self.max_y);
        let pad_x = (max_x - min_x) * fraction;
        let pad_y = (max_y - min_y) * fraction;
        Bounds::new(min_x - pad_x, min_y - pad_y, max_x + pad_x, max_y + pad_y)
    }

    /// Expand the shorter axis so both have the same span (equal aspect).
    pub fn squared(&self) -> Bounds {
        let span = self.width().max(self.height());
        let cx = (self.min_x + self.max_x) / 2.0;
        let cy = (self.min_y + self.max_y) / 2.0;
        Bounds::new(cx - span / 2.0, cy - span / 2.0, cx + span / 2.0, cy + span / 2.0)
    }

    /// Map a data-space point into `rect`, flipping y so up is up.
    pub fn project(&self, p: Point, rect: &Rect) -> Point {
        let sx = rect.width / self.width();
        let sy = rect.height / self.height();
        Point::new(
            rect.x + (p.x - self.min_x) * sx,
            rect.y + rect.height - (p.y - self.min_y) * sy,
        )
    }
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Shrink by independent margins on each side.
    pub fn inset(&self, left: f64, top: f64, right: f64, bottom: f64) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(1.0),
            (self.height - top - bottom).max(1.0),
        )
    }

    /// Largest centered square that fits.
    pub fn centered_square(&self) -> Rect {
        let side = self.width.min(self.height);
        Rect::new(
            self.x + (self.width - side) / 2.0,
            self.y + (self.height - side) / 2.0,
            side,
            side,
        )
    }
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max - min > f64::EPSILON {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    }
}

/// Split a point sequence into polylines at non-finite points.
///
/// An expression like `tan(t)` or `1/t` yields inf/NaN samples; those
/// break the curve instead of producing an unparsable path.
pub fn split_finite(points: impl IntoIterator<Item = Point>) -> Vec<Polyline> {
    let mut lines = Vec::new();
    let mut current: Polyline = Vec::new();

    for p in points {
        if p.is_finite() {
            current.push(p);
        } else if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_ignore_non_finite_points() {
        let b = Bounds::from_points(vec![
            Point::new(0.0, 1.0),
            Point::new(f64::NAN, 5.0),
            Point::new(2.0, -1.0),
            Point::new(1.0, f64::INFINITY),
        ])
        .unwrap();
        assert_eq!(b, Bounds::new(0.0, -1.0, 2.0, 1.0));
    }

    #[test]
    fn empty_points_have_no_bounds() {
        assert!(Bounds::from_points(Vec::new()).is_none());
    }

    #[test]
    fn padded_widens_flat_axis() {
        let flat = Bounds::new(0.0, 0.0, 10.0, 0.0);
        let p = flat.padded(0.0);
        assert!(p.height() > 0.0);
        assert_eq!(p.width(), 10.0);
    }

    #[test]
    fn squared_has_equal_spans() {
        let b = Bounds::new(-1.0, -3.0, 1.0, 3.0).squared();
        assert!((b.width() - b.height()).abs() < 1e-12);
        assert!((b.min_x + 3.0).abs() < 1e-12);
    }

    #[test]
    fn project_flips_y() {
        let b = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let rect = Rect::new(10.0, 10.0, 100.0, 100.0);
        let top_right = b.project(Point::new(1.0, 1.0), &rect);
        assert_eq!(top_right, Point::new(110.0, 10.0));
        let bottom_left = b.project(Point::new(0.0, 0.0), &rect);
        assert_eq!(bottom_left, Point::new(10.0, 110.0));
    }

    #[test]
    fn split_finite_breaks_at_gaps() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, f64::INFINITY),
            Point::new(3.0, 0.0),
            Point::new(f64::NAN, 0.0),
        ];
        let lines = split_finite(pts);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 1);
    }
}
