use serde::{Deserialize, Serialize};

/// A planar point in millimetres.
///
/// Serialized as a two element array (`[x, y]`), which is the interchange shape used by
/// every path, mark and outline in the geometry document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Distance from `self` to the segment `a`-`b`.
    ///
    /// The foot of the perpendicular is clamped to the segment, so points beyond either
    /// end measure to that end point.
    #[must_use]
    pub fn distance_to_segment(self, a: Point, b: Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance_to(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
    }

    /// Round both coordinates to `decimals` decimal places.
    #[must_use]
    pub fn rounded(self, decimals: i32) -> Point {
        Point::new(round_to(self.x, decimals), round_to(self.y, decimals))
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Round `value` to `decimals` decimal places (half away from zero).
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    // Normalize negative zero so serialized output stays stable.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn serializes_as_pair() {
        let p = Point::new(1.5, -2.0);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[1.5,-2.0]");
        let back: Point = serde_json::from_str("[3, 4]").unwrap();
        assert_eq!(back, Point::new(3.0, 4.0));
    }

    #[test]
    fn distance_to_segment_clamps_to_ends() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_abs_diff_eq!(Point::new(5.0, 3.0).distance_to_segment(a, b), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Point::new(20.0, 0.0).distance_to_segment(a, b), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Point::new(-3.0, -4.0).distance_to_segment(a, b), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn distance_to_degenerate_segment_uses_anchor() {
        let a = Point::new(1.0, 1.0);
        let d = Point::new(4.0, 5.0).distance_to_segment(a, a);
        assert_abs_diff_eq!(d, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rounding_keeps_three_decimals() {
        assert_eq!(round_to(12.34567, 3), 12.346);
        assert_eq!(round_to(-0.0001, 3), 0.0);
        assert!(round_to(-0.0001, 3).is_sign_positive());
        assert_eq!(Point::new(1.00049, 2.9996).rounded(3), Point::new(1.0, 3.0));
    }
}
