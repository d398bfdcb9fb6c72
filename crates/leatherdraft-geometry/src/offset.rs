use std::collections::HashSet;

use cavalier_contours::polyline::{PlineOffsetOptions, PlineSource, Polyline};
use leatherdraft_core::{Piece, Point};
use tracing::{debug, warn};

use crate::error::GeometryError;
use crate::flatten::{check_tolerance, piece_polyline, DEFAULT_TOLERANCE};
use crate::grid::{self, GridPoint, SCALE};
use crate::joins::{straighten, JoinStyle};
use crate::validate::{is_simple, to_polyline};

/// Default miter limit, as a multiple of the offset distance.
pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetOptions {
    /// Curve flattening tolerance in millimetres, also used for round joins.
    pub tolerance: f64,
    /// Longest allowed miter as a multiple of the offset distance; sharper corners get a
    /// square cap one offset distance beyond the vertex.
    pub miter_limit: f64,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            miter_limit: DEFAULT_MITER_LIMIT,
        }
    }
}

impl OffsetOptions {
    pub fn validate(&self) -> Result<(), GeometryError> {
        check_tolerance(self.tolerance)?;
        if !(self.miter_limit.is_finite() && self.miter_limit >= 1.0) {
            return Err(GeometryError::MiterLimit {
                limit: self.miter_limit,
            });
        }
        Ok(())
    }
}

/// Seam-allowance outline of `piece` at `delta` millimetres with default options.
///
/// Positive `delta` grows the outline, negative shrinks it. The result is closed (first
/// point repeated) or empty when no outline can be produced.
#[must_use]
pub fn offset(piece: &Piece, delta: f64) -> Vec<Point> {
    match offset_with(piece, delta, &OffsetOptions::default()) {
        Ok(outline) => outline,
        Err(err) => {
            warn!(piece = %piece.name, %err, "no seam allowance produced");
            Vec::new()
        }
    }
}

/// Like [`offset`], with explicit options. Degenerate outlines give an empty result;
/// only invalid options or non-finite input are errors.
pub fn offset_with(
    piece: &Piece,
    delta: f64,
    options: &OffsetOptions,
) -> Result<Vec<Point>, GeometryError> {
    let outline = piece_polyline(piece, options.tolerance)?;
    match offset_polygon(&outline, delta, options) {
        Err(GeometryError::Degenerate { vertices }) => {
            debug!(piece = %piece.name, vertices, "outline too small to offset");
            Ok(Vec::new())
        }
        result => result,
    }
}

/// Offset a polygon given as a vertex ring (a closing duplicate is optional).
///
/// The ring is snapped to a 1/1000 mm grid, oriented counter-clockwise and handed to
/// the `cavalier_contours` offset, which splits the result wherever it folds over
/// itself. Free corners of each loop are mitered (see [`OffsetOptions::miter_limit`]);
/// the loop with the largest area is returned, closed.
pub fn offset_polygon(
    points: &[Point],
    delta: f64,
    options: &OffsetOptions,
) -> Result<Vec<Point>, GeometryError> {
    options.validate()?;
    if !delta.is_finite() {
        return Err(GeometryError::NonFinite {
            what: "offset distance",
        });
    }
    if !points.iter().all(Point::is_finite) {
        return Err(GeometryError::NonFinite {
            what: "outline vertex",
        });
    }
    let vertices = distinct_vertices(points);
    if vertices < 3 {
        return Err(GeometryError::Degenerate { vertices });
    }

    let mut source: Vec<GridPoint> = points.iter().copied().map(GridPoint::snap).collect();
    grid::clean(&mut source);
    if source.len() < 3 {
        return Err(GeometryError::Degenerate {
            vertices: source.len(),
        });
    }
    if grid::area2(&source) < 0 {
        source.reverse();
    }
    if delta == 0.0 {
        return Ok(closed(&source));
    }

    let raw: Vec<Point> = source.iter().map(|p| p.raw()).collect();
    let kernel_options = PlineOffsetOptions {
        handle_self_intersects: true,
        ..Default::default()
    };
    // Positive kernel offsets move left of travel, which is inwards here.
    let loops = to_polyline(&raw).parallel_offset_opt(-delta * SCALE, &kernel_options);
    let count = loops.len();
    let tolerance = options.tolerance * SCALE;
    let best = loops
        .iter()
        .map(|pl| straight_loop(pl, options.miter_limit, tolerance))
        .map(|ring| (grid::area2(&ring), ring))
        .filter(|(area, _)| *area > 0)
        .max_by_key(|(area, _)| *area);

    let Some((_, ring)) = best else {
        debug!(delta, loops = count, "offset collapsed");
        return Ok(Vec::new());
    };
    let outline = closed(&ring);
    if !is_simple(&outline) {
        warn!(delta, vertices = outline.len(), "offset outline is not simple");
    }
    Ok(outline)
}

/// Grid ring for one kernel loop, falling back to round joins where sharpening the
/// corners makes the loop overlap itself.
fn straight_loop(pline: &Polyline<f64>, miter_limit: f64, tolerance: f64) -> Vec<GridPoint> {
    let mitered = straighten(pline, JoinStyle::Mitered, miter_limit, tolerance);
    let raw: Vec<Point> = mitered.iter().map(|p| p.raw()).collect();
    if mitered.len() < 3 || is_simple(&raw) {
        return mitered;
    }
    debug!(vertices = mitered.len(), "mitered corners overlap, keeping round joins");
    straighten(pline, JoinStyle::Round, miter_limit, tolerance)
}

fn closed(ring: &[GridPoint]) -> Vec<Point> {
    let mut outline: Vec<Point> = ring.iter().map(|p| p.to_point()).collect();
    if let Some(&first) = outline.first() {
        outline.push(first);
    }
    outline
}

fn distinct_vertices(points: &[Point]) -> usize {
    // Adding zero folds -0.0 into 0.0.
    points
        .iter()
        .map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
        .collect::<HashSet<_>>()
        .len()
}

/// Attach a seam-allowance outline to every piece that asks for one.
///
/// A piece's own `seam_allowance` wins over `default_allowance`. Pieces without a
/// positive allowance, or whose offset is empty, end up without an outline. Returns the
/// number of pieces that received one.
pub fn attach_seam_allowance(pieces: &mut [Piece], default_allowance: Option<f64>) -> usize {
    let mut attached = 0;
    for piece in pieces.iter_mut() {
        let Some(allowance) = piece.seam_allowance.or(default_allowance) else {
            debug!(piece = %piece.name, "no seam allowance requested");
            continue;
        };
        if allowance <= 0.0 {
            debug!(piece = %piece.name, allowance, "seam allowance is not positive");
            continue;
        }
        let outline = offset(piece, allowance);
        if outline.is_empty() {
            warn!(piece = %piece.name, allowance, "seam allowance not available");
            piece.seam_allowance_outline = None;
        } else {
            debug!(piece = %piece.name, allowance, vertices = outline.len(), "attached seam allowance");
            piece.seam_allowance_outline = Some(outline);
            attached += 1;
        }
    }
    attached
}
