//! Flattening, seam-allowance offsetting and validation of piece outlines.
//!
//! Curves are flattened with [`flatten`] / [`piece_polyline`]; [`offset`] grows or
//! shrinks the flattened outline through the `cavalier_contours` offset with mitered
//! corners on a fixed-point grid, and [`is_simple`] checks a closed outline for
//! self-intersections.

mod error;
mod flatten;
mod grid;
mod joins;
mod offset;
mod validate;

pub use error::GeometryError;
pub use flatten::{flatten, piece_polyline, DEFAULT_TOLERANCE, MAX_DEPTH};
pub use grid::SCALE;
pub use offset::{
    attach_seam_allowance, offset, offset_polygon, offset_with, OffsetOptions,
    DEFAULT_MITER_LIMIT,
};
pub use validate::{is_simple, to_polyline};
