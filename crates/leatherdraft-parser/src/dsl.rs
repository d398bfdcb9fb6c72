//! Line-oriented pattern DSL.
//!
//! ```text
//! PIECE <name>
//! MOVE x,y
//! LINE x,y
//! CURVE x1,y1 -> x2,y2 -> x3,y3
//! ARC ...                      # kept verbatim, never interpreted
//! CLOSE
//! NOTCH x,y "label"
//! DRILL x,y "label"
//! GRAIN x1,y1 -> x2,y2
//! SA <millimetres>
//! END
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use leatherdraft_core::{Grain, Mark, PathCommand, Piece, Point};
use tracing::debug;

use crate::error::ParseError;

const COMMANDS: [&str; 9] = [
    "MOVE", "LINE", "CURVE", "ARC", "CLOSE", "NOTCH", "DRILL", "GRAIN", "SA",
];

struct Line<'a> {
    number: usize,
    content: &'a str,
}

impl Line<'_> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.number,
            content: self.content.to_string(),
            message: message.into(),
        }
    }
}

/// Parse DSL text into pieces. Any malformed line aborts the whole parse.
pub fn parse(text: &str) -> Result<Vec<Piece>, ParseError> {
    let mut pieces: Vec<Piece> = Vec::new();
    let mut open: Option<(Piece, usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let line = Line {
            number: idx + 1,
            content,
        };
        let (keyword, rest) = content
            .split_once(char::is_whitespace)
            .map_or((content, ""), |(k, r)| (k, r.trim()));

        match keyword {
            "PIECE" => {
                if let Some((piece, _, _)) = &open {
                    return Err(line.error(format!(
                        "PIECE \"{}\" is still open (missing END)",
                        piece.name
                    )));
                }
                if rest.is_empty() {
                    return Err(line.error("PIECE requires a name"));
                }
                if pieces.iter().any(|p| p.name == rest) {
                    return Err(line.error(format!("duplicate piece name \"{rest}\"")));
                }
                open = Some((Piece::new(rest), line.number, content.to_string()));
            }
            "END" => {
                if !rest.is_empty() {
                    return Err(line.error("END takes no arguments"));
                }
                let (piece, _, _) = open
                    .take()
                    .ok_or_else(|| line.error("END without an open PIECE"))?;
                debug!(piece = %piece.name, commands = piece.paths.len(), "parsed piece");
                pieces.push(piece);
            }
            kw if COMMANDS.contains(&kw) => {
                let Some((piece, _, _)) = open.as_mut() else {
                    return Err(line.error("command outside of a PIECE/END block"));
                };
                apply_command(piece, kw, rest, &line)?;
            }
            _ => return Err(line.error("unknown command")),
        }
    }

    if let Some((piece, number, content)) = open {
        return Err(ParseError {
            line: number,
            content,
            message: format!("PIECE \"{}\" is never closed with END", piece.name),
        });
    }

    Ok(pieces)
}

fn apply_command(piece: &mut Piece, keyword: &str, rest: &str, line: &Line) -> Result<(), ParseError> {
    match keyword {
        "MOVE" => {
            let to = parse_point(rest, line)?;
            piece.paths.push(PathCommand::MoveTo { to });
        }
        "LINE" => {
            let to = parse_point(rest, line)?;
            piece.paths.push(PathCommand::LineTo { to });
        }
        "CURVE" => {
            let [cp1, cp2, to] = parse_points::<3>(rest, line)?;
            if piece.pen().is_none() {
                return Err(line.error("CURVE needs a current point (MOVE or LINE first)"));
            }
            piece.paths.push(PathCommand::CurveTo { cp1, cp2, to });
        }
        "ARC" => {
            piece.paths.push(PathCommand::Arc {
                raw: serde_json::Value::String(line.content.to_string()),
            });
        }
        "CLOSE" => {
            if !rest.is_empty() {
                return Err(line.error("CLOSE takes no arguments"));
            }
            piece.paths.push(PathCommand::Close {});
        }
        "NOTCH" => piece.notches.push(parse_mark(rest, line)?),
        "DRILL" => piece.drills.push(parse_mark(rest, line)?),
        "GRAIN" => {
            let [start, end] = parse_points::<2>(rest, line)?;
            piece.grain = Some(Grain::new(start, end));
        }
        "SA" => piece.seam_allowance = Some(parse_number(rest, line)?),
        _ => return Err(line.error("unknown command")),
    }
    Ok(())
}

fn parse_number(token: &str, line: &Line) -> Result<f64, ParseError> {
    let token = token.trim();
    let value: f64 = token
        .parse()
        .map_err(|_| line.error(format!("malformed number \"{token}\"")))?;
    if !value.is_finite() {
        return Err(line.error(format!("number \"{token}\" is not finite")));
    }
    Ok(value)
}

fn parse_point(token: &str, line: &Line) -> Result<Point, ParseError> {
    let Some((x, y)) = token.split_once(',') else {
        return Err(line.error(format!("expected x,y but found \"{}\"", token.trim())));
    };
    if y.contains(',') {
        return Err(line.error(format!("expected x,y but found \"{}\"", token.trim())));
    }
    Ok(Point::new(parse_number(x, line)?, parse_number(y, line)?))
}

fn parse_points<const N: usize>(body: &str, line: &Line) -> Result<[Point; N], ParseError> {
    let parts: Vec<&str> = body.split("->").collect();
    if parts.len() != N {
        return Err(line.error(format!(
            "expected {N} points separated by \"->\", found {}",
            parts.len()
        )));
    }
    let mut out = [Point::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = parse_point(part, line)?;
    }
    Ok(out)
}

fn parse_mark(body: &str, line: &Line) -> Result<Mark, ParseError> {
    let Some((coords, tail)) = body.split_once('"') else {
        return Err(line.error("missing quoted label"));
    };
    let Some(label) = tail.strip_suffix('"') else {
        return Err(line.error("unterminated label"));
    };
    let at = parse_point(coords, line)?;
    Ok(Mark::new(at, label.trim()))
}
