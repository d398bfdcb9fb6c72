use thiserror::Error;

/// Failure to evaluate an arithmetic expression. Always carries the full expression text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} in expression \"{expr}\"")]
pub struct EvalError {
    pub expr: String,
    pub kind: EvalErrorKind,
}

impl EvalError {
    pub(crate) fn new(expr: &str, kind: EvalErrorKind) -> Self {
        Self {
            expr: expr.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("operator \"{op}\" is not allowed")]
    ForbiddenOperator { op: String },

    #[error("call to \"{name}\" is not allowed")]
    ForbiddenCall { name: String },

    #[error("unknown name \"{name}\"")]
    UnknownName { name: String },

    #[error("\"{name}\" is not a namespace")]
    NotANamespace { name: String },

    #[error("\"{name}\" is a namespace, not a number")]
    NamespaceAsNumber { name: String },

    #[error("unknown attribute \"{attr}\" of \"{base}\"")]
    UnknownAttribute { base: String, attr: String },

    #[error("{func}() {message}")]
    Arity { func: &'static str, message: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

/// Malformed DSL input. `line` is 1-indexed and `content` is the trimmed source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}: `{content}`")]
pub struct ParseError {
    pub line: usize,
    pub content: String,
    pub message: String,
}
