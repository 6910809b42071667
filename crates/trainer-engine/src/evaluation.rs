//! Position evaluation types.

use std::fmt;

use uci::Score;

/// Pawns at which the evaluation bar saturates.
const BAR_RANGE_PAWNS: f64 = 10.0;

/// A position evaluation from White's point of view.
///
/// Evaluations can be either centipawn scores (for normal positions)
/// or mate scores (when a forced mate is found).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawn evaluation (positive = white advantage)
    Centipawns(i32),
    /// Mate in N moves (positive = white mates, negative = black mates)
    Mate(i32),
}

impl Evaluation {
    /// The even evaluation used when no engine answer is available.
    pub const NEUTRAL: Evaluation = Evaluation::Centipawns(0);

    /// Converts an engine score, which is relative to the side to move, to
    /// White's point of view.
    ///
    /// `mate 0` means the side to move is already mated, so it counts as a
    /// loss for the side to move.
    #[must_use]
    pub fn from_score(score: &Score, white_to_move: bool) -> Self {
        let sign = if white_to_move { 1 } else { -1 };
        match *score {
            Score::Cp(cp) => Evaluation::Centipawns(sign * cp),
            Score::Mate(0) => Evaluation::Mate(-sign),
            Score::Mate(n) => Evaluation::Mate(sign * n),
        }
    }

    /// The same evaluation seen from the other side of the board.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(n) => Evaluation::Mate(-n),
        }
    }

    /// Share of the evaluation bar that belongs to this side, in `0.0..=1.0`.
    ///
    /// Centipawns map linearly from -10 pawns (empty) to +10 pawns (full);
    /// a mate for this side fills the bar and a mate against it empties it.
    #[must_use]
    pub fn bar_share(self) -> f64 {
        match self {
            Evaluation::Centipawns(cp) => {
                let pawns = f64::from(cp) / 100.0;
                ((pawns + BAR_RANGE_PAWNS) / (2.0 * BAR_RANGE_PAWNS)).clamp(0.0, 1.0)
            }
            Evaluation::Mate(n) if n > 0 => 1.0,
            Evaluation::Mate(_) => 0.0,
        }
    }

    /// Short label: `+0.35`, `-1.20`, `M3`, `M-3`.
    #[must_use]
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::NEUTRAL
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", f64::from(cp) / 100.0),
            Evaluation::Mate(n) => write!(f, "M{}", n),
        }
    }
}

/// One evaluation per side, as shown next to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationPair {
    pub white: Evaluation,
    pub black: Evaluation,
}

impl EvaluationPair {
    /// Builds both views from White's evaluation.
    #[must_use]
    pub fn from_white(white: Evaluation) -> Self {
        Self {
            white,
            black: white.flipped(),
        }
    }

    /// `0.0 / 0.0`, used when the engine query fails.
    #[must_use]
    pub fn neutral() -> Self {
        Self::from_white(Evaluation::NEUTRAL)
    }
}
