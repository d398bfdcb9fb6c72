//! Corner joins for kernel offsets.
//!
//! `cavalier_contours` joins offset segments with arcs centred on the source vertex. An
//! arc that runs untouched from one straight segment to the next is a free corner and
//! becomes a miter point, or a square cap once the miter would pass the limit. Arcs that
//! were trimmed where the offset meets another part of itself keep their round shape
//! and are flattened.

use cavalier_contours::polyline::{PlineVertex, Polyline};
use leatherdraft_core::Point;

use crate::grid::{self, GridPoint};

/// Largest sine between two directions still treated as tangent.
const TANGENT_SIN: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinStyle {
    /// Free corners are mitered or squared.
    Mitered,
    /// Every arc is flattened.
    Round,
}

/// One arc segment of a polyline, in the polyline's units.
#[derive(Debug, Clone, Copy)]
struct Arc {
    start: Point,
    end: Point,
    center: Point,
    /// Point halfway along the arc.
    apex: Point,
    radius: f64,
    bulge: f64,
}

impl Arc {
    fn new(from: PlineVertex<f64>, to: PlineVertex<f64>) -> Self {
        let (start, end) = (Point::new(from.x, from.y), Point::new(to.x, to.y));
        let chord = start.distance_to(end);
        let b = from.bulge;
        // Positive bulges turn counter-clockwise, which bows the arc to the right.
        let right = ((end.y - start.y) / chord, (start.x - end.x) / chord);
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let sagitta = b * chord / 2.0;
        let apex = Point::new(mid.x + right.0 * sagitta, mid.y + right.1 * sagitta);
        let radius = chord * (1.0 + b * b) / (4.0 * b.abs());
        let outward = (right.0 * b.signum(), right.1 * b.signum());
        let center = Point::new(apex.x - outward.0 * radius, apex.y - outward.1 * radius);
        Self {
            start,
            end,
            center,
            apex,
            radius,
            bulge: b,
        }
    }

    /// Unit vector from the centre towards the middle of the arc.
    fn outward(&self) -> (f64, f64) {
        unit(self.apex.x - self.center.x, self.apex.y - self.center.y)
    }

    /// Direction of travel at `p`, a point on the circle.
    fn tangent_at(&self, p: Point) -> (f64, f64) {
        let (rx, ry) = (p.x - self.center.x, p.y - self.center.y);
        let (tx, ty) = if self.bulge > 0.0 { (-ry, rx) } else { (ry, -rx) };
        unit(tx, ty)
    }

    /// Sharp replacement for the arc: the miter point, or the two ends of a square cap.
    ///
    /// `None` for arcs sweeping more than half a turn, which no single corner produces.
    fn corner(&self, miter_limit: f64) -> Option<Vec<Point>> {
        let b = self.bulge.abs();
        if b > 1.0 {
            return None;
        }
        // Miter length over radius is 1 / cos(sweep / 2).
        if b < 1.0 {
            let ratio = (1.0 + b * b) / (1.0 - b * b);
            if ratio <= miter_limit {
                let (ux, uy) = self.outward();
                let reach = self.radius * ratio;
                return Some(vec![Point::new(
                    self.center.x + ux * reach,
                    self.center.y + uy * reach,
                )]);
            }
        }
        // The cap is tangent to the arc at its middle and spans tan(sweep / 4) radii
        // either side.
        let half = b * self.radius;
        let (cx, cy) = unit(self.start.x - self.end.x, self.start.y - self.end.y);
        Some(vec![
            Point::new(self.apex.x + cx * half, self.apex.y + cy * half),
            Point::new(self.apex.x - cx * half, self.apex.y - cy * half),
        ])
    }

    /// Points strictly between the ends, no further than `tolerance` from the arc.
    fn interior(&self, tolerance: f64) -> Vec<Point> {
        let sweep = 4.0 * self.bulge.atan();
        let step = if tolerance < self.radius {
            2.0 * (1.0 - tolerance / self.radius).acos()
        } else {
            sweep.abs()
        };
        let steps = (sweep.abs() / step).ceil().max(1.0) as usize;
        let (rx, ry) = (self.start.x - self.center.x, self.start.y - self.center.y);
        (1..steps)
            .map(|k| {
                let (sin, cos) = (sweep * k as f64 / steps as f64).sin_cos();
                Point::new(
                    self.center.x + rx * cos - ry * sin,
                    self.center.y + rx * sin + ry * cos,
                )
            })
            .collect()
    }
}

fn unit(x: f64, y: f64) -> (f64, f64) {
    let len = x.hypot(y);
    if len == 0.0 {
        (0.0, 0.0)
    } else {
        (x / len, y / len)
    }
}

fn same_direction(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 * b.1 - a.1 * b.0).abs() <= TANGENT_SIN && a.0 * b.0 + a.1 * b.1 > 0.0
}

fn position(v: PlineVertex<f64>) -> Point {
    Point::new(v.x, v.y)
}

/// The arc starting at vertex `i` runs from the end of a straight segment to the start
/// of another, tangent to both.
fn is_free_corner(vertices: &[PlineVertex<f64>], i: usize, arc: &Arc) -> bool {
    let n = vertices.len();
    let (prev, next) = (vertices[(i + n - 1) % n], vertices[(i + 1) % n]);
    if !prev.bulge_is_zero() || !next.bulge_is_zero() {
        return false;
    }
    let after = position(vertices[(i + 2) % n]);
    let incoming = unit(arc.start.x - prev.x, arc.start.y - prev.y);
    let outgoing = unit(after.x - arc.end.x, after.y - arc.end.y);
    same_direction(incoming, arc.tangent_at(arc.start))
        && same_direction(outgoing, arc.tangent_at(arc.end))
}

/// Straight-edged ring for a closed kernel polyline, snapped to the grid and cleaned.
pub(crate) fn straighten(
    pline: &Polyline<f64>,
    style: JoinStyle,
    miter_limit: f64,
    tolerance: f64,
) -> Vec<GridPoint> {
    let vertices = &pline.vertex_data;
    let n = vertices.len();
    let mut emitted: Vec<Vec<Point>> = Vec::with_capacity(n);
    // A replaced arc also stands in for the vertex that ends it.
    let mut replaced = vec![false; n];
    for i in 0..n {
        let v = vertices[i];
        if v.bulge_is_zero() {
            emitted.push(vec![position(v)]);
            continue;
        }
        let arc = Arc::new(v, vertices[(i + 1) % n]);
        let corner = match style {
            JoinStyle::Mitered if is_free_corner(vertices, i, &arc) => arc.corner(miter_limit),
            _ => None,
        };
        if let Some(points) = corner {
            emitted.push(points);
            replaced[(i + 1) % n] = true;
        } else {
            let mut points = vec![arc.start];
            points.extend(arc.interior(tolerance));
            emitted.push(points);
        }
    }

    let mut ring: Vec<GridPoint> = emitted
        .into_iter()
        .zip(replaced)
        .filter(|(_, skip)| !skip)
        .flat_map(|(points, _)| points)
        .map(GridPoint::round)
        .collect();
    grid::clean(&mut ring);
    ring
}
