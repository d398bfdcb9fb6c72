use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BlockError;

/// An expression slot: a literal number or an expression string (optionally `{...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarExpr {
    Number(f64),
    String(String),
}

impl ScalarExpr {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarExpr::String(s) => Some(s),
            ScalarExpr::Number(_) => None,
        }
    }
}

impl From<f64> for ScalarExpr {
    fn from(n: f64) -> Self {
        ScalarExpr::Number(n)
    }
}

impl From<&str> for ScalarExpr {
    fn from(s: &str) -> Self {
        ScalarExpr::String(s.to_string())
    }
}

pub type PointExpr = [ScalarExpr; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveExpr {
    pub cp1: PointExpr,
    pub cp2: PointExpr,
    pub to: PointExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum PathDecl {
    Move {
        expr: PointExpr,
    },
    Line {
        expr: PointExpr,
    },
    Curve {
        expr: CurveExpr,
    },
    /// Payload is carried through untouched.
    Arc {
        #[serde(default)]
        expr: serde_json::Value,
    },
    Close {},
}

/// `[x, y, "label"]`; the label is copied, never evaluated.
pub type MarkDecl = (ScalarExpr, ScalarExpr, String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceDecl {
    pub name: String,
    #[serde(default)]
    pub params: IndexMap<String, ScalarExpr>,
    #[serde(default)]
    pub paths: Vec<PathDecl>,
    #[serde(default)]
    pub notches: Vec<MarkDecl>,
    #[serde(default)]
    pub drills: Vec<MarkDecl>,
    /// `[x1, y1, x2, y2]`.
    #[serde(default)]
    pub grain: Option<[ScalarExpr; 4]>,
    #[serde(default)]
    pub seam_allowance: Option<ScalarExpr>,
}

/// A parametric block: ordered top-level parameters and the pieces drafted from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub params: IndexMap<String, ScalarExpr>,
    #[serde(default)]
    pub pieces: Vec<PieceDecl>,
}

impl Block {
    pub fn from_json(text: &str) -> Result<Self, BlockError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, BlockError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_declarations_from_json() {
        let block = Block::from_json(
            r#"{
                "params": {"W": "{M.chest / 4}", "L": 600},
                "pieces": [{
                    "name": "front",
                    "paths": [
                        {"type": "MOVE", "expr": ["0", 0]},
                        {"type": "CURVE", "expr": {"cp1": ["W", "0"], "cp2": ["W", "L"], "to": [0, "L"]}},
                        {"type": "ARC"},
                        {"type": "CLOSE"}
                    ],
                    "notches": [["W / 2", 0, "CF"]]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(block.params.keys().collect::<Vec<_>>(), ["W", "L"]);
        assert_eq!(block.params["L"], ScalarExpr::Number(600.0));
        let front = &block.pieces[0];
        assert_eq!(
            front.paths[0],
            PathDecl::Move {
                expr: ["0".into(), 0.0.into()]
            }
        );
        assert!(matches!(front.paths[1], PathDecl::Curve { .. }));
        assert_eq!(
            front.paths[2],
            PathDecl::Arc {
                expr: serde_json::Value::Null
            }
        );
        assert_eq!(front.paths[3], PathDecl::Close {});
        assert_eq!(front.notches[0].2, "CF");
        assert!(front.grain.is_none());
    }

    #[test]
    fn unknown_path_type_is_rejected() {
        let err = Block::from_json(r#"{"pieces": [{"name": "a", "paths": [{"type": "SPLINE"}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, BlockError::Json(_)));
    }

    #[test]
    fn yaml_blocks() {
        let block = Block::from_yaml(
            "params:\n  W: M.chest / 4\npieces:\n  - name: back\n    grain: [10, 10, 10, W]\n",
        )
        .unwrap();
        assert_eq!(block.pieces[0].name, "back");
        assert_eq!(block.pieces[0].grain.as_ref().unwrap()[3], ScalarExpr::from("W"));
    }
}
