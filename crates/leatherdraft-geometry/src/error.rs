use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("flatten tolerance must be a positive finite number, got {tolerance}")]
    Configuration { tolerance: f64 },

    #[error("miter limit must be a finite number of at least 1, got {limit}")]
    MiterLimit { limit: f64 },

    #[error("{what} is not finite")]
    NonFinite { what: &'static str },

    #[error("outline has {vertices} distinct vertices, at least 3 are needed")]
    Degenerate { vertices: usize },
}
