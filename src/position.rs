use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TreeError;

/// Placement of an inserted mug relative to a reference mug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Immediately before the reference among its siblings
    Before,
    /// Immediately after the reference among its siblings
    After,
    /// Appended as the last child of the reference
    Into,
    /// First child of the reference
    First,
    /// Last child of the reference
    Last,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Before,
        Position::After,
        Position::Into,
        Position::First,
        Position::Last,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Before => "before",
            Position::After => "after",
            Position::Into => "into",
            Position::First => "first",
            Position::Last => "last",
        }
    }

    /// True for placements that make the reference the new parent.
    pub fn is_child_placement(&self) -> bool {
        matches!(self, Position::Into | Position::First | Position::Last)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| TreeError::InvalidPosition(s.to_string()))
    }
}
