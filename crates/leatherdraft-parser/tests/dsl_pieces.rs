use leatherdraft_core::{Grain, Mark, PathCommand, Point};
use leatherdraft_parser::parse_dsl;

const SQUARE: &str = "PIECE p\nMOVE 0,0\nLINE 0,10\nLINE 10,10\nLINE 10,0\nCLOSE\nNOTCH 5,10 \"top\"\nGRAIN 1,1 -> 1,9\nSA 8\nEND\n";

#[test]
fn square_piece_with_markup() {
    let pieces = parse_dsl(SQUARE).unwrap();
    assert_eq!(pieces.len(), 1);

    let p = &pieces[0];
    assert_eq!(p.name, "p");
    assert_eq!(p.paths.len(), 5);
    assert_eq!(p.paths[0], PathCommand::MoveTo { to: Point::new(0.0, 0.0) });
    for cmd in &p.paths[1..4] {
        assert_eq!(cmd.kind(), "LINE");
    }
    assert_eq!(p.paths[4], PathCommand::Close {});
    assert!(p.is_closed());
    assert_eq!(p.notches, vec![Mark::new(Point::new(5.0, 10.0), "top")]);
    assert!(p.drills.is_empty());
    assert_eq!(p.grain, Some(Grain::new(Point::new(1.0, 1.0), Point::new(1.0, 9.0))));
    assert_eq!(p.seam_allowance, Some(8.0));
    assert_eq!(p.seam_allowance_outline, None);
}

#[test]
fn pieces_keep_file_order() {
    let text = "PIECE back\nMOVE 0,0\nEND\n\n# second\nPIECE front\nMOVE 1,1\nEND\n";
    let names: Vec<_> = parse_dsl(text).unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["back", "front"]);
}

#[test]
fn command_before_piece_is_rejected() {
    let err = parse_dsl("MOVE 0,0\nPIECE p\nEND\n").unwrap_err();
    assert_eq!(err.line, 1);
    assert_eq!(err.content, "MOVE 0,0");
}

#[test]
fn command_after_end_is_rejected() {
    let err = parse_dsl("PIECE p\nMOVE 0,0\nEND\nLINE 5,5\n").unwrap_err();
    assert_eq!(err.line, 4);
    assert_eq!(err.content, "LINE 5,5");
}

#[test]
fn comments_and_indentation_are_ignored() {
    let text = "  # header\n\nPIECE p\n    MOVE 0, 0\n    LINE 3.5 , -2e1\nEND\n";
    let pieces = parse_dsl(text).unwrap();
    assert_eq!(pieces[0].paths[1], PathCommand::LineTo { to: Point::new(3.5, -20.0) });
}
