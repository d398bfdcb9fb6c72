use leatherdraft_core::{Piece, Point};
use leatherdraft_geometry::{is_simple, offset, piece_polyline, DEFAULT_TOLERANCE};
use leatherdraft_parser::parse_dsl;

fn area(ring: &[Point]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

fn piece(dsl: &str) -> Piece {
    parse_dsl(dsl).unwrap().remove(0)
}

/// Distance from the closest offset vertex to the flattened outline.
fn clearance(piece: &Piece, out: &[Point]) -> f64 {
    let base = piece_polyline(piece, DEFAULT_TOLERANCE).unwrap();
    out.iter()
        .map(|p| {
            base.windows(2)
                .map(|w| p.distance_to_segment(w[0], w[1]))
                .fold(f64::INFINITY, f64::min)
        })
        .fold(f64::INFINITY, f64::min)
}

const S_CURVE: &str = "PIECE s_curve\n\
    MOVE 0,0\n\
    LINE 100,0\n\
    CURVE 160,100 -> 40,200 -> 100,300\n\
    LINE 0,300\n\
    CURVE -60,200 -> 60,100 -> 0,0\n\
    CLOSE\n\
    END\n";

const BODICE: &str = "PIECE bodice\n\
    MOVE 0,0\n\
    LINE 250,0\n\
    LINE 250,300\n\
    CURVE 250,360 -> 210,380 -> 190,450\n\
    LINE 80,450\n\
    CURVE 80,400 -> 30,380 -> 0,380\n\
    CLOSE\n\
    END\n";

#[test]
fn s_curve_insets_keep_their_shape() {
    let s = piece(S_CURVE);
    let shallow = offset(&s, -3.0);
    let deep = offset(&s, -8.0);
    assert!(!shallow.is_empty());
    assert!(!deep.is_empty());
    assert!(is_simple(&shallow));
    assert!(is_simple(&deep));

    let (a3, a8) = (area(&shallow), area(&deep));
    assert!(a3 > a8, "{a3} <= {a8}");
    assert!(a8 > 23_000.0 && a8 < 24_500.0, "{a8}");
    assert!(clearance(&s, &deep) > 7.99);
}

#[test]
fn bodice_insets_shrink_steadily() {
    let bodice = piece(BODICE);
    let base = piece_polyline(&bodice, DEFAULT_TOLERANCE).unwrap();
    let mut previous = area(&base);
    for delta in [5.0, 10.0, 30.0] {
        let out = offset(&bodice, -delta);
        assert!(!out.is_empty(), "inset {delta} collapsed");
        assert!(is_simple(&out), "inset {delta} is not simple");
        let a = area(&out);
        assert!(a > 0.0 && a < previous, "inset {delta}: {a} vs {previous}");
        assert!(clearance(&bodice, &out) > delta - 0.01, "inset {delta}");
        previous = a;
    }
}

#[test]
fn curved_pieces_grow_without_self_contact() {
    for dsl in [S_CURVE, BODICE] {
        let p = piece(dsl);
        let out = offset(&p, 10.0);
        assert!(is_simple(&out), "{}", p.name);
        assert!(clearance(&p, &out) > 9.99, "{}", p.name);
    }
}
