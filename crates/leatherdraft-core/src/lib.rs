//! Pattern piece data model shared by the parsers, the interpreter and the geometry engine.

mod document;
mod piece;
mod point;

pub use document::{GeometryDocument, LengthUnit};
pub use piece::{commands_to_outline, outline_to_commands, Grain, Mark, PathCommand, Piece};
pub use point::{round_to, Point};
