//! Parametric pattern blocks.
//!
//! A block is a JSON or YAML document of named expressions. [`interpret`] evaluates it
//! against body measurements (`M`), fit adjustments (`F`) and drafting options (`O`)
//! and produces finished [`Piece`](leatherdraft_core::Piece) geometry.

mod block;
mod error;
mod inputs;
mod interpret;

pub use block::{Block, CurveExpr, MarkDecl, PathDecl, PieceDecl, PointExpr, ScalarExpr};
pub use error::{BlockError, TOP_LEVEL};
pub use inputs::{Measurements, Options, DEFAULT_HEM_ALLOWANCE};
pub use interpret::{interpret, COORDINATE_DECIMALS};
