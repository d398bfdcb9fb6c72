use assert_json_diff::assert_json_eq;
use leatherdraft_core::{GeometryDocument, Grain, Mark, PathCommand, Piece, Point};
use serde_json::json;

fn square_piece() -> Piece {
    let mut piece = Piece::new("front_panel_A");
    piece.paths = vec![
        PathCommand::MoveTo {
            to: Point::new(0.0, 0.0),
        },
        PathCommand::LineTo {
            to: Point::new(0.0, 520.0),
        },
        PathCommand::LineTo {
            to: Point::new(140.0, 520.0),
        },
        PathCommand::LineTo {
            to: Point::new(140.0, 0.0),
        },
        PathCommand::Close {},
    ];
    piece.notches.push(Mark::new(Point::new(20.0, 520.0), "CF hem"));
    piece.grain = Some(Grain::new(Point::new(30.0, 20.0), Point::new(30.0, 300.0)));
    piece.seam_allowance = Some(8.0);
    piece
}

#[test]
fn document_matches_interchange_shape() {
    let doc = GeometryDocument::new(vec![square_piece()]);
    let got = serde_json::to_value(&doc).unwrap();
    assert_json_eq!(
        got,
        json!({
            "units": "mm",
            "pieces": [{
                "name": "front_panel_A",
                "paths": [
                    {"type": "MOVE", "data": {"to": [0.0, 0.0]}},
                    {"type": "LINE", "data": {"to": [0.0, 520.0]}},
                    {"type": "LINE", "data": {"to": [140.0, 520.0]}},
                    {"type": "LINE", "data": {"to": [140.0, 0.0]}},
                    {"type": "CLOSE", "data": {}}
                ],
                "notches": [[20.0, 520.0, "CF hem"]],
                "drills": [],
                "grain": [[30.0, 20.0], [30.0, 300.0]],
                "seam_allowance": 8.0
            }]
        })
    );
}

#[test]
fn seam_allowance_outline_is_written_as_sa_paths() {
    let mut piece = square_piece();
    piece.seam_allowance_outline = Some(vec![
        Point::new(-8.0, -8.0),
        Point::new(-8.0, 528.0),
        Point::new(148.0, 528.0),
        Point::new(148.0, -8.0),
        Point::new(-8.0, -8.0),
    ]);
    let doc = GeometryDocument::new(vec![piece]);
    let v = serde_json::to_value(&doc).unwrap();
    let sa = &v["pieces"][0]["sa_paths"];
    assert_eq!(sa.as_array().unwrap().len(), 5);
    assert_eq!(sa[0], json!({"type": "MOVE", "data": {"to": [-8.0, -8.0]}}));
    assert_eq!(sa[4], json!({"type": "LINE", "data": {"to": [-8.0, -8.0]}}));

    let back: GeometryDocument = serde_json::from_value(v).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn minimal_piece_documents_deserialize() {
    let doc: GeometryDocument = serde_json::from_value(json!({
        "units": "mm",
        "pieces": [{"name": "strap", "paths": [], "grain": null}]
    }))
    .unwrap();
    let strap = doc.piece("strap").unwrap();
    assert!(strap.notches.is_empty());
    assert!(strap.grain.is_none());
    assert!(strap.seam_allowance_outline.is_none());
    assert!(doc.piece("missing").is_none());
}
