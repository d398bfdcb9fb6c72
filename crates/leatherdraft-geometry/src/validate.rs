use cavalier_contours::polyline::{PlineSource, PlineVertex, Polyline};
use leatherdraft_core::Point;

/// Closed polyline through `points`, with repeated and closing vertices removed.
#[must_use]
pub fn to_polyline(points: &[Point]) -> Polyline<f64> {
    let mut pts = points.to_vec();
    pts.dedup();
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    let mut pl = Polyline::new_closed();
    for p in pts {
        pl.vertex_data.push(PlineVertex::new(p.x, p.y, 0.0));
    }
    pl
}

/// Whether the closed vertex list encloses area without crossing or touching itself.
///
/// The closing duplicate is optional. Fewer than three distinct vertices, or a zero-area
/// ring, is not simple.
#[must_use]
pub fn is_simple(points: &[Point]) -> bool {
    let pl = to_polyline(points);
    pl.vertex_count() >= 3 && pl.area() != 0.0 && !pl.scan_for_self_intersect()
}
