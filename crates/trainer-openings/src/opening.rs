//! Core opening types.

use serde::{Deserialize, Serialize};

/// A named, fixed move sequence played from the initial position.
///
/// Moves alternate White, Black, White, ... starting at index 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningLine {
    /// Display name of the line (e.g., "Sicilian Defense: Najdorf Variation").
    pub name: String,
    /// The moves in UCI notation.
    pub moves: Vec<String>,
}

/// An opening with all of its catalogued lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    /// The name shown in the opening menu.
    pub name: String,
    /// The lines the trainer may pick from.
    pub lines: Vec<OpeningLine>,
}

impl OpeningLine {
    /// Creates a new line with the given name and moves.
    #[must_use]
    pub fn new(name: impl Into<String>, moves: Vec<String>) -> Self {
        Self {
            name: name.into(),
            moves,
        }
    }

    /// Creates a line from borrowed move strings.
    #[must_use]
    pub fn from_moves(name: impl Into<String>, moves: &[&str]) -> Self {
        Self::new(name, moves.iter().map(|m| (*m).to_string()).collect())
    }

    /// Number of plies in the line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns the move at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.moves.get(index).map(String::as_str)
    }

    /// Returns the index and text of the first move that is not UCI-shaped.
    #[must_use]
    pub fn first_malformed(&self) -> Option<(usize, &str)> {
        self.moves
            .iter()
            .enumerate()
            .find(|(_, mv)| !is_uci_move(mv))
            .map(|(i, mv)| (i, mv.as_str()))
    }
}

impl Opening {
    /// Creates a new opening with the given name and lines.
    #[must_use]
    pub fn new(name: impl Into<String>, lines: Vec<OpeningLine>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Finds a line by its exact name.
    #[must_use]
    pub fn line(&self, name: &str) -> Option<&OpeningLine> {
        self.lines.iter().find(|l| l.name == name)
    }
}

/// Returns true if `mv` has the shape of a UCI move: two squares and an
/// optional promotion piece (`e2e4`, `e7e8q`).
///
/// This is a syntactic check only; legality is decided by the rules.
#[must_use]
pub fn is_uci_move(mv: &str) -> bool {
    let bytes = mv.as_bytes();
    if bytes.len() != 4 && bytes.len() != 5 {
        return false;
    }

    let is_file = |b: u8| (b'a'..=b'h').contains(&b);
    let is_rank = |b: u8| (b'1'..=b'8').contains(&b);

    let squares_ok =
        is_file(bytes[0]) && is_rank(bytes[1]) && is_file(bytes[2]) && is_rank(bytes[3]);
    let promotion_ok = bytes.len() == 4 || matches!(bytes[4], b'q' | b'r' | b'b' | b'n');

    squares_ok && promotion_ok && bytes[0..2] != bytes[2..4]
}
