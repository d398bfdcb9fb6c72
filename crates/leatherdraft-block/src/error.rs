use leatherdraft_parser::EvalError;
use thiserror::Error;

/// Piece label used for errors raised while evaluating top-level parameters.
pub const TOP_LEVEL: &str = "<params>";

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("failed to parse block JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse block YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("piece \"{piece}\", {field}: {source}")]
    Eval {
        piece: String,
        field: String,
        source: EvalError,
    },

    #[error("parameter \"{name}\" in \"{piece}\" shadows a reserved namespace")]
    ReservedName { piece: String, name: String },

    #[error("piece name \"{name}\" is declared more than once")]
    DuplicatePiece { name: String },

    #[error("piece #{index} has an empty name")]
    EmptyPieceName { index: usize },

    #[error("piece \"{piece}\", paths[{index}]: CURVE without a current point")]
    PenNotSet { piece: String, index: usize },
}
