//! Expression evaluation and text parsing for leatherdraft.
//!
//! Two front ends live here: a sandboxed arithmetic evaluator used by the block
//! interpreter for every numeric field, and the line-oriented pattern DSL.

pub mod dsl;
mod error;
mod eval;
mod expr;
mod scope;

pub use dsl::parse as parse_dsl;
pub use error::{EvalError, EvalErrorKind, ParseError};
pub use eval::{evaluate, strip_delimiters};
pub use expr::{BinaryOp, Builtin, Expr, UnaryOp, MAX_NESTING};
pub use scope::{is_reserved, Binding, Scope, RESERVED_NAMESPACES};
