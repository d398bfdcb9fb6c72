use serde::{Deserialize, Serialize};

use crate::piece::Piece;

/// Length unit tag of a geometry document. Only millimetres are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
}

/// The drafting output handed to exporters: a unit tag plus every piece.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryDocument {
    #[serde(default)]
    pub units: LengthUnit,
    #[serde(default)]
    pub pieces: Vec<Piece>,
}

impl GeometryDocument {
    #[must_use]
    pub fn new(pieces: Vec<Piece>) -> Self {
        Self {
            units: LengthUnit::Millimeters,
            pieces,
        }
    }

    #[must_use]
    pub fn piece(&self, name: &str) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.name == name)
    }
}
