use leatherdraft_core::{PathCommand, Piece, Point};
use tracing::warn;

use crate::error::GeometryError;

/// Default flattening tolerance in millimetres.
pub const DEFAULT_TOLERANCE: f64 = 0.2;

/// Subdivision depth after which a segment is accepted regardless of flatness.
pub const MAX_DEPTH: u32 = 24;

/// Approximate the cubic Bezier `p0 p1 p2 p3` by a polyline.
///
/// Uses de Casteljau bisection on an explicit stack. A segment is accepted once both
/// inner control points lie within `tolerance` of its chord. The result always starts
/// at `p0` and ends at `p3`.
pub fn flatten(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    tolerance: f64,
) -> Result<Vec<Point>, GeometryError> {
    check_tolerance(tolerance)?;
    if ![p0, p1, p2, p3].iter().all(Point::is_finite) {
        return Err(GeometryError::NonFinite {
            what: "curve control point",
        });
    }

    let mut out = vec![p0];
    let mut stack = vec![([p0, p1, p2, p3], 0u32)];
    while let Some(([a, b, c, d], depth)) = stack.pop() {
        let error = b.distance_to_segment(a, d).max(c.distance_to_segment(a, d));
        if error <= tolerance || depth >= MAX_DEPTH {
            out.push(d);
            continue;
        }
        let ab = a.midpoint(b);
        let bc = b.midpoint(c);
        let cd = c.midpoint(d);
        let abc = ab.midpoint(bc);
        let bcd = bc.midpoint(cd);
        let mid = abc.midpoint(bcd);
        // Right half first so the left half is processed next.
        stack.push(([mid, bcd, cd, d], depth + 1));
        stack.push(([a, ab, abc, mid], depth + 1));
    }
    Ok(out)
}

/// Flatten a piece's outline into one polyline.
///
/// `MOVE`/`LINE` points are taken as is, each `CURVE` is flattened from the current pen
/// without repeating the shared start point, and `ARC` placeholders are skipped. When the
/// piece declares `CLOSE` the polyline is closed by repeating its first point.
pub fn piece_polyline(piece: &Piece, tolerance: f64) -> Result<Vec<Point>, GeometryError> {
    check_tolerance(tolerance)?;

    let mut points: Vec<Point> = Vec::new();
    let mut pen: Option<Point> = None;
    for cmd in &piece.paths {
        match *cmd {
            PathCommand::MoveTo { to } | PathCommand::LineTo { to } => {
                points.push(to);
                pen = Some(to);
            }
            PathCommand::CurveTo { cp1, cp2, to } => {
                let Some(start) = pen else {
                    warn!(piece = %piece.name, "skipping CURVE without a current point");
                    continue;
                };
                points.extend(flatten(start, cp1, cp2, to, tolerance)?.into_iter().skip(1));
                pen = Some(to);
            }
            PathCommand::Arc { .. } | PathCommand::Close {} => {}
        }
    }

    if piece.is_closed() {
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if first != last {
                points.push(first);
            }
        }
    }
    Ok(points)
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<(), GeometryError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::Configuration { tolerance })
    }
}
