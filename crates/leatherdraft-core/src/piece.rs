use serde::{Deserialize, Serialize};

use crate::point::Point;

/// One pen instruction of a piece outline.
///
/// Serialized adjacently tagged (`{"type": "LINE", "data": {"to": [x, y]}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PathCommand {
    #[serde(rename = "MOVE")]
    MoveTo { to: Point },
    #[serde(rename = "LINE")]
    LineTo { to: Point },
    #[serde(rename = "CURVE")]
    CurveTo { cp1: Point, cp2: Point, to: Point },
    /// Arc placeholder. The payload is kept verbatim and never turned into geometry.
    #[serde(rename = "ARC")]
    Arc { raw: serde_json::Value },
    #[serde(rename = "CLOSE")]
    Close {},
}

impl PathCommand {
    /// The point the pen rests on after this command, if the command moves it.
    #[must_use]
    pub fn end_point(&self) -> Option<Point> {
        match self {
            PathCommand::MoveTo { to }
            | PathCommand::LineTo { to }
            | PathCommand::CurveTo { to, .. } => Some(*to),
            PathCommand::Arc { .. } | PathCommand::Close {} => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PathCommand::MoveTo { .. } => "MOVE",
            PathCommand::LineTo { .. } => "LINE",
            PathCommand::CurveTo { .. } => "CURVE",
            PathCommand::Arc { .. } => "ARC",
            PathCommand::Close {} => "CLOSE",
        }
    }
}

/// A labelled markup point (notch or drill hole). Serialized as `[x, y, "label"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, String)", into = "(f64, f64, String)")]
pub struct Mark {
    pub at: Point,
    pub label: String,
}

impl Mark {
    #[must_use]
    pub fn new(at: Point, label: impl Into<String>) -> Self {
        Self {
            at,
            label: label.into(),
        }
    }
}

impl From<(f64, f64, String)> for Mark {
    fn from((x, y, label): (f64, f64, String)) -> Self {
        Mark::new(Point::new(x, y), label)
    }
}

impl From<Mark> for (f64, f64, String) {
    fn from(m: Mark) -> Self {
        (m.at.x, m.at.y, m.label)
    }
}

/// Grain line axis. Serialized as `[[x1, y1], [x2, y2]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Point; 2]", into = "[Point; 2]")]
pub struct Grain {
    pub start: Point,
    pub end: Point,
}

impl Grain {
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

impl From<[Point; 2]> for Grain {
    fn from([start, end]: [Point; 2]) -> Self {
        Grain::new(start, end)
    }
}

impl From<Grain> for [Point; 2] {
    fn from(g: Grain) -> Self {
        [g.start, g.end]
    }
}

/// A single pattern piece: outline, markup and optional seam allowance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub name: String,
    #[serde(default)]
    pub paths: Vec<PathCommand>,
    #[serde(default)]
    pub notches: Vec<Mark>,
    #[serde(default)]
    pub drills: Vec<Mark>,
    #[serde(default)]
    pub grain: Option<Grain>,
    /// Requested seam allowance in millimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seam_allowance: Option<f64>,
    /// Computed seam-allowance outline (closed: first point repeated at the end).
    #[serde(
        default,
        rename = "sa_paths",
        with = "sa_paths",
        skip_serializing_if = "Option::is_none"
    )]
    pub seam_allowance_outline: Option<Vec<Point>>,
}

impl Piece {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paths: Vec::new(),
            notches: Vec::new(),
            drills: Vec::new(),
            grain: None,
            seam_allowance: None,
            seam_allowance_outline: None,
        }
    }

    /// Whether the outline declares a `CLOSE`.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.paths.iter().any(|c| matches!(c, PathCommand::Close {}))
    }

    /// Current pen position after all path commands, if one has been established.
    #[must_use]
    pub fn pen(&self) -> Option<Point> {
        self.paths.iter().rev().find_map(PathCommand::end_point)
    }
}

/// Convert a closed outline into a `MOVE` followed by `LINE` commands.
#[must_use]
pub fn outline_to_commands(outline: &[Point]) -> Vec<PathCommand> {
    let mut it = outline.iter().copied();
    let Some(first) = it.next() else {
        return Vec::new();
    };
    std::iter::once(PathCommand::MoveTo { to: first })
        .chain(it.map(|to| PathCommand::LineTo { to }))
        .collect()
}

/// Collect the vertices of a `MOVE`/`LINE` command list. Other commands are skipped.
#[must_use]
pub fn commands_to_outline(commands: &[PathCommand]) -> Vec<Point> {
    commands
        .iter()
        .filter_map(|c| match c {
            PathCommand::MoveTo { to } | PathCommand::LineTo { to } => Some(*to),
            _ => None,
        })
        .collect()
}

mod sa_paths {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{commands_to_outline, outline_to_commands, PathCommand};
    use crate::point::Point;

    pub fn serialize<S: Serializer>(
        outline: &Option<Vec<Point>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        outline
            .as_deref()
            .map(outline_to_commands)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Point>>, D::Error> {
        let commands = Option::<Vec<PathCommand>>::deserialize(deserializer)?;
        Ok(commands.map(|c| commands_to_outline(&c)))
    }
}
