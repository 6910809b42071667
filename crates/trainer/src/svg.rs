//! SVG export of the current position.
//!
//! The board is rendered through an askama template with the last move and
//! any highlighted squares marked.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use thiserror::Error;
use tracing::info;
use trainer_core::{BoardSquare, Side, Snapshot};

const SQUARE_SIZE: u32 = 50;
const CAPTION_HEIGHT: u32 = 28;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to render snapshot: {0}")]
    Render(#[from] askama::Error),
}

/// One square of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareView {
    pub x: u32,
    pub y: u32,
    /// CSS class: `light`, `dark`, `last-move` or `highlight`.
    pub class: &'static str,
}

/// A piece, positioned at the centre of its square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceView {
    pub x: u32,
    pub y: u32,
    pub symbol: char,
}

#[derive(Template)]
#[template(path = "board.svg")]
pub struct BoardSvg {
    pub size: u32,
    pub square: u32,
    pub caption_height: u32,
    pub title: String,
    pub caption: String,
    pub squares: Vec<SquareView>,
    pub pieces: Vec<PieceView>,
}

impl BoardSvg {
    /// Builds the board for a snapshot, White at the bottom.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot, highlights: &[BoardSquare]) -> Self {
        let last_move = snapshot.last_move_squares();
        let board = snapshot.board();
        let mut squares = Vec::with_capacity(64);
        let mut pieces = Vec::new();

        for (row, rank) in board.iter().enumerate() {
            for (col, piece) in rank.iter().enumerate() {
                let Some(square) = BoardSquare::from_row_col(row, col) else {
                    continue;
                };
                let x = col as u32 * SQUARE_SIZE;
                let y = row as u32 * SQUARE_SIZE;
                let class = if highlights.contains(&square) {
                    "highlight"
                } else if last_move.is_some_and(|(from, to)| from == square || to == square) {
                    "last-move"
                } else if square.is_dark() {
                    "dark"
                } else {
                    "light"
                };
                squares.push(SquareView { x, y, class });

                if let Some(symbol) = piece.and_then(Self::piece_to_symbol) {
                    pieces.push(PieceView {
                        x: x + SQUARE_SIZE / 2,
                        y: y + SQUARE_SIZE / 2,
                        symbol,
                    });
                }
            }
        }

        let title = format!("{} - {}", snapshot.opening, snapshot.line_name);
        let caption = match snapshot.termination {
            Some(termination) => format!("{title}: {termination}"),
            None => format!("{title}: {} to move", snapshot.state.side_to_move),
        };

        Self {
            size: SQUARE_SIZE * 8,
            square: SQUARE_SIZE,
            caption_height: CAPTION_HEIGHT,
            title,
            caption,
            squares,
            pieces,
        }
    }

    /// Unicode chess symbol for a FEN piece letter.
    #[must_use]
    const fn piece_to_symbol(piece: char) -> Option<char> {
        match piece {
            'K' => Some('\u{2654}'),
            'Q' => Some('\u{2655}'),
            'R' => Some('\u{2656}'),
            'B' => Some('\u{2657}'),
            'N' => Some('\u{2658}'),
            'P' => Some('\u{2659}'),
            'k' => Some('\u{265A}'),
            'q' => Some('\u{265B}'),
            'r' => Some('\u{265C}'),
            'b' => Some('\u{265D}'),
            'n' => Some('\u{265E}'),
            'p' => Some('\u{265F}'),
            _ => None,
        }
    }
}

/// Renders the snapshot into `dir` and returns the file written.
///
/// Files are named after the line and the ply, so saving the same position
/// twice overwrites the earlier file.
pub fn write_snapshot(
    dir: &Path,
    snapshot: &Snapshot,
    highlights: &[BoardSquare],
) -> Result<PathBuf, SnapshotError> {
    let svg = BoardSvg::from_snapshot(snapshot, highlights).render()?;
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(snapshot));
    fs::write(&path, svg)?;
    info!(path = %path.display(), "snapshot written");
    Ok(path)
}

fn file_name(snapshot: &Snapshot) -> String {
    let mut slug = String::new();
    for c in snapshot.line_name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "position" } else { slug };
    format!("{slug}-ply-{:03}.svg", ply(snapshot))
}

/// Plies played, from the FEN move counter.
fn ply(snapshot: &Snapshot) -> u32 {
    let fullmove: u32 = snapshot
        .fen
        .split_whitespace()
        .nth(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);
    let black = u32::from(snapshot.state.side_to_move == Side::Black);
    fullmove.saturating_sub(1) * 2 + black
}
