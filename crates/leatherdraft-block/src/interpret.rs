use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use leatherdraft_core::{round_to, Grain, Mark, PathCommand, Piece, Point};
use leatherdraft_parser::{
    evaluate, is_reserved, strip_delimiters, EvalError, EvalErrorKind, Scope,
};
use tracing::debug;

use crate::block::{Block, MarkDecl, PathDecl, PieceDecl, PointExpr, ScalarExpr};
use crate::error::{BlockError, TOP_LEVEL};
use crate::inputs::Options;

/// Decimal places kept for every drafted coordinate.
pub const COORDINATE_DECIMALS: i32 = 3;

/// Draft every piece of `block`.
///
/// Top-level parameters are evaluated in declaration order over the `M`, `F` and `O`
/// namespaces. Each piece then evaluates its own parameters in a child scope, so
/// piece-local names are invisible to the other pieces. The first failure aborts the
/// whole block.
pub fn interpret(
    block: &Block,
    measurements: &IndexMap<String, f64>,
    fit: &IndexMap<String, f64>,
    options: &Options,
) -> Result<Vec<Piece>, BlockError> {
    let root = Scope::with_namespaces(measurements.clone(), fit.clone(), options.namespace())
        .into_shared();
    let shared = bind_params(&root, TOP_LEVEL, &block.params)?.into_shared();
    debug!(params = block.params.len(), "evaluated block parameters");

    let mut seen = IndexSet::new();
    let mut pieces = Vec::with_capacity(block.pieces.len());
    for (index, decl) in block.pieces.iter().enumerate() {
        if decl.name.trim().is_empty() {
            return Err(BlockError::EmptyPieceName { index });
        }
        if !seen.insert(decl.name.as_str()) {
            return Err(BlockError::DuplicatePiece {
                name: decl.name.clone(),
            });
        }
        pieces.push(draft_piece(&shared, decl)?);
    }
    Ok(pieces)
}

fn bind_params(
    parent: &Arc<Scope>,
    piece: &str,
    params: &IndexMap<String, ScalarExpr>,
) -> Result<Scope, BlockError> {
    let mut scope = Scope::child(parent);
    for (name, expr) in params {
        if is_reserved(name) {
            return Err(BlockError::ReservedName {
                piece: piece.to_string(),
                name: name.clone(),
            });
        }
        let value = Fields {
            piece,
            scope: &scope,
        }
        .value(&format!("params.{name}"), expr)?;
        scope.bind(name.clone(), value);
    }
    Ok(scope)
}

fn draft_piece(shared: &Arc<Scope>, decl: &PieceDecl) -> Result<Piece, BlockError> {
    let scope = bind_params(shared, &decl.name, &decl.params)?;
    let fields = Fields {
        piece: &decl.name,
        scope: &scope,
    };

    let mut piece = Piece::new(decl.name.clone());
    for (index, cmd) in decl.paths.iter().enumerate() {
        let field = format!("paths[{index}]");
        let command = match cmd {
            PathDecl::Move { expr } => PathCommand::MoveTo {
                to: fields.point(&field, expr)?,
            },
            PathDecl::Line { expr } => PathCommand::LineTo {
                to: fields.point(&field, expr)?,
            },
            PathDecl::Curve { expr } => {
                if piece.pen().is_none() {
                    return Err(BlockError::PenNotSet {
                        piece: decl.name.clone(),
                        index,
                    });
                }
                PathCommand::CurveTo {
                    cp1: fields.point(&format!("{field}.cp1"), &expr.cp1)?,
                    cp2: fields.point(&format!("{field}.cp2"), &expr.cp2)?,
                    to: fields.point(&format!("{field}.to"), &expr.to)?,
                }
            }
            PathDecl::Arc { expr } => PathCommand::Arc { raw: expr.clone() },
            PathDecl::Close {} => PathCommand::Close {},
        };
        piece.paths.push(command);
    }

    piece.notches = fields.marks("notches", &decl.notches)?;
    piece.drills = fields.marks("drills", &decl.drills)?;

    if let Some([x1, y1, x2, y2]) = &decl.grain {
        piece.grain = Some(Grain::new(
            fields.point("grain.start", &[x1.clone(), y1.clone()])?,
            fields.point("grain.end", &[x2.clone(), y2.clone()])?,
        ));
    }
    if let Some(sa) = &decl.seam_allowance {
        piece.seam_allowance = Some(round_to(
            fields.value("seam_allowance", sa)?,
            COORDINATE_DECIMALS,
        ));
    }

    debug!(
        piece = %piece.name,
        params = decl.params.len(),
        commands = piece.paths.len(),
        "drafted piece"
    );
    Ok(piece)
}

/// Evaluates the fields of one piece, tagging failures with the piece and field name.
struct Fields<'a> {
    piece: &'a str,
    scope: &'a Scope,
}

impl Fields<'_> {
    fn value(&self, field: &str, expr: &ScalarExpr) -> Result<f64, BlockError> {
        match expr {
            ScalarExpr::Number(n) if n.is_finite() => Ok(*n),
            ScalarExpr::Number(n) => Err(self.error(
                field,
                EvalError {
                    expr: n.to_string(),
                    kind: EvalErrorKind::NonFinite,
                },
            )),
            ScalarExpr::String(s) => evaluate(strip_delimiters(s), self.scope)
                .map_err(|source| self.error(field, source)),
        }
    }

    fn error(&self, field: &str, source: EvalError) -> BlockError {
        BlockError::Eval {
            piece: self.piece.to_string(),
            field: field.to_string(),
            source,
        }
    }

    fn point(&self, field: &str, [x, y]: &PointExpr) -> Result<Point, BlockError> {
        let x = self.value(&format!("{field}.x"), x)?;
        let y = self.value(&format!("{field}.y"), y)?;
        Ok(Point::new(x, y).rounded(COORDINATE_DECIMALS))
    }

    fn marks(&self, kind: &str, decls: &[MarkDecl]) -> Result<Vec<Mark>, BlockError> {
        decls
            .iter()
            .enumerate()
            .map(|(i, (x, y, label))| {
                let at = self.point(&format!("{kind}[{i}]"), &[x.clone(), y.clone()])?;
                Ok(Mark::new(at, label.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn measurements() -> (IndexMap<String, f64>, IndexMap<String, f64>) {
        (
            IndexMap::from([
                ("chest".to_string(), 100.0),
                ("back_length".to_string(), 450.0),
            ]),
            IndexMap::from([("ease_chest".to_string(), 6.0)]),
        )
    }

    fn run(block: serde_json::Value) -> Result<Vec<Piece>, BlockError> {
        let block: Block = serde_json::from_value(block).unwrap();
        let (m, f) = measurements();
        interpret(&block, &m, &f, &Options::default())
    }

    #[test]
    fn drafts_a_front_panel() {
        let pieces = run(json!({
            "params": {"W": "{M.chest / 4 + F.ease_chest}", "L": "M.back_length"},
            "pieces": [{
                "name": "front",
                "params": {"half": "W / 2"},
                "paths": [
                    {"type": "MOVE", "expr": ["0", 0]},
                    {"type": "LINE", "expr": ["W", "0"]},
                    {"type": "CURVE", "expr": {"cp1": ["W", "L / 3"], "cp2": ["W", "2 * L / 3"], "to": ["half", "L"]}},
                    {"type": "ARC", "expr": {"r": 5}},
                    {"type": "CLOSE"}
                ],
                "notches": [["half", "L", "CF"]],
                "drills": [["10", "10", "snap"]],
                "grain": ["10", "10", "10", "L - 10"],
                "seam_allowance": "O.hem_allowance / 2"
            }]
        }))
        .unwrap();

        assert_eq!(pieces.len(), 1);
        let front = &pieces[0];
        assert_eq!(front.paths[1], PathCommand::LineTo { to: Point::new(31.0, 0.0) });
        assert_eq!(
            front.paths[2],
            PathCommand::CurveTo {
                cp1: Point::new(31.0, 150.0),
                cp2: Point::new(31.0, 300.0),
                to: Point::new(15.5, 450.0),
            }
        );
        assert_eq!(front.paths[3], PathCommand::Arc { raw: json!({"r": 5}) });
        assert_eq!(front.paths[4], PathCommand::Close {});
        assert_eq!(front.notches, vec![Mark::new(Point::new(15.5, 450.0), "CF")]);
        assert_eq!(front.drills, vec![Mark::new(Point::new(10.0, 10.0), "snap")]);
        assert_eq!(
            front.grain,
            Some(Grain::new(Point::new(10.0, 10.0), Point::new(10.0, 440.0)))
        );
        assert_eq!(front.seam_allowance, Some(10.0));
    }

    #[test]
    fn coordinates_are_rounded_to_three_decimals() {
        let pieces = run(json!({
            "pieces": [{"name": "a", "paths": [{"type": "MOVE", "expr": ["10 / 3", "-2 / 3"]}]}]
        }))
        .unwrap();
        assert_eq!(pieces[0].paths[0], PathCommand::MoveTo { to: Point::new(3.333, -0.667) });
    }

    #[test]
    fn piece_params_do_not_leak() {
        let err = run(json!({
            "pieces": [
                {"name": "a", "params": {"x": 5}, "paths": [{"type": "MOVE", "expr": ["x", 0]}]},
                {"name": "b", "paths": [{"type": "MOVE", "expr": ["x", 0]}]}
            ]
        }))
        .unwrap_err();
        match err {
            BlockError::Eval { piece, field, source } => {
                assert_eq!(piece, "b");
                assert_eq!(field, "paths[0].x");
                assert_eq!(source.kind, EvalErrorKind::UnknownName { name: "x".into() });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn piece_params_shadow_top_level() {
        let pieces = run(json!({
            "params": {"W": 10},
            "pieces": [
                {"name": "a", "params": {"W": "W * 2"}, "paths": [{"type": "MOVE", "expr": ["W", 0]}]},
                {"name": "b", "paths": [{"type": "MOVE", "expr": ["W", 0]}]}
            ]
        }))
        .unwrap();
        assert_eq!(pieces[0].pen(), Some(Point::new(20.0, 0.0)));
        assert_eq!(pieces[1].pen(), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn params_are_evaluated_in_declaration_order() {
        let err = run(json!({"params": {"A": "B + 1", "B": 1}})).unwrap_err();
        match err {
            BlockError::Eval { piece, field, .. } => {
                assert_eq!(piece, TOP_LEVEL);
                assert_eq!(field, "params.A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn error_message_names_the_expression() {
        let err = run(json!({
            "pieces": [{"name": "a", "paths": [
                {"type": "MOVE", "expr": [0, 0]},
                {"type": "CURVE", "expr": {"cp1": [0, 0], "cp2": ["M.neck", 0], "to": [1, 1]}}
            ]}]
        }))
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("paths[1].cp2.x"), "{msg}");
        assert!(msg.contains("M.neck"), "{msg}");
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            run(json!({"params": {"M": 1}})).unwrap_err(),
            BlockError::ReservedName { .. }
        ));
        assert!(matches!(
            run(json!({"pieces": [{"name": "a", "params": {"O": 1}}]})).unwrap_err(),
            BlockError::ReservedName { piece, .. } if piece == "a"
        ));
        assert!(matches!(
            run(json!({"pieces": [{"name": "a"}, {"name": "a"}]})).unwrap_err(),
            BlockError::DuplicatePiece { .. }
        ));
        assert!(matches!(
            run(json!({"pieces": [{"name": "  "}]})).unwrap_err(),
            BlockError::EmptyPieceName { index: 0 }
        ));
        assert!(matches!(
            run(json!({"pieces": [{"name": "a", "paths": [
                {"type": "CURVE", "expr": {"cp1": [0, 0], "cp2": [1, 1], "to": [2, 2]}}
            ]}]}))
            .unwrap_err(),
            BlockError::PenNotSet { index: 0, .. }
        ));
    }

    #[test]
    fn division_by_zero_aborts_everything() {
        let err = run(json!({
            "pieces": [
                {"name": "ok", "paths": [{"type": "MOVE", "expr": [0, 0]}]},
                {"name": "bad", "paths": [{"type": "MOVE", "expr": ["1 / (M.chest - 100)", 0]}]}
            ]
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            BlockError::Eval { ref source, .. } if source.kind == EvalErrorKind::DivisionByZero
        ));
    }

    #[test]
    fn non_finite_literals_are_rejected() {
        let (m, f) = measurements();
        let yaml = "pieces:\n  - name: strap\n    paths:\n      - {type: MOVE, expr: [0, 0]}\n      - {type: LINE, expr: [.inf, 30]}\n";
        let block = Block::from_yaml(yaml).unwrap();
        let err = interpret(&block, &m, &f, &Options::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("strap"), "{msg}");
        assert!(msg.contains("paths[1].x"), "{msg}");
        assert!(matches!(
            err,
            BlockError::Eval { ref source, .. } if source.kind == EvalErrorKind::NonFinite
        ));

        let yaml = "params:\n  W: .nan\npieces: []\n";
        let block = Block::from_yaml(yaml).unwrap();
        let err = interpret(&block, &m, &f, &Options::default()).unwrap_err();
        assert!(err.to_string().contains("params.W"), "{err}");
    }
}
