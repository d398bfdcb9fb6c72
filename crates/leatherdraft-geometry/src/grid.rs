//! Fixed-point rings for the offset engine.
//!
//! Outlines go through the offset kernel in 1/1000 mm grid units and come back snapped
//! to that grid, so orientation and collinearity checks on the result are exact.

use leatherdraft_core::Point;

/// Grid steps per millimetre.
pub const SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl GridPoint {
    pub fn snap(p: Point) -> Self {
        Self {
            x: (p.x * SCALE).round() as i64,
            y: (p.y * SCALE).round() as i64,
        }
    }

    /// Grid position as floating point grid units.
    pub fn raw(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Position in millimetres.
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64 / SCALE, self.y as f64 / SCALE)
    }

    /// Round a position given in grid units.
    pub fn round(p: Point) -> Self {
        Self {
            x: p.x.round() as i64,
            y: p.y.round() as i64,
        }
    }
}

/// Twice the signed area of `a b c`; positive for a left turn.
fn orient(a: GridPoint, b: GridPoint, c: GridPoint) -> i128 {
    let (abx, aby) = (i128::from(b.x - a.x), i128::from(b.y - a.y));
    let (acx, acy) = (i128::from(c.x - a.x), i128::from(c.y - a.y));
    abx * acy - aby * acx
}

/// Twice the signed area of a ring; positive when counter-clockwise.
pub(crate) fn area2(ring: &[GridPoint]) -> i128 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y)
        })
        .sum()
}

/// Remove repeated and collinear vertices, including a closing duplicate.
pub(crate) fn clean(ring: &mut Vec<GridPoint>) {
    loop {
        ring.dedup();
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        let n = ring.len();
        if n < 3 {
            return;
        }
        let keep: Vec<bool> = (0..n)
            .map(|i| orient(ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]) != 0)
            .collect();
        if keep.iter().all(|&k| k) {
            return;
        }
        let mut flags = keep.into_iter();
        ring.retain(|_| flags.next().unwrap_or(true));
    }
}
