//! Rules provider abstraction.
//!
//! The dispatcher never inspects a position itself. It applies moves and asks
//! questions through [`RulesProvider`]; [`StandardRules`] answers them with
//! `shakmaty`.

use std::fmt;

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position, Rank, Role, Square};
use thiserror::Error;

/// A side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("White"),
            Side::Black => f.write_str("Black"),
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// Errors reported by a rules provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The text is not a UCI move.
    #[error("invalid UCI move: {0}")]
    InvalidUci(String),
    /// The move is well-formed but not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// The FEN could not be parsed or describes an impossible position.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    /// A catalogued line contains a move that is illegal where it occurs.
    #[error("line '{line}': move {index} ('{mv}') is illegal")]
    IllegalLine {
        line: String,
        index: usize,
        mv: String,
    },
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate { winner: Side },
    Stalemate,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate { winner } => write!(f, "Checkmate, {winner} wins"),
            Termination::Stalemate => f.write_str("Stalemate, draw"),
        }
    }
}

/// Terminal flags of the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardStatus {
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
}

impl BoardStatus {
    /// `Checkmate`, `Check`, `Stalemate`, or `None` for a quiet position.
    #[must_use]
    pub fn label(&self) -> Option<&'static str> {
        if self.checkmate {
            Some("Checkmate")
        } else if self.check {
            Some("Check")
        } else if self.stalemate {
            Some("Stalemate")
        } else {
            None
        }
    }
}

/// Authoritative position, legality and terminal conditions.
///
/// Moves are exchanged as UCI strings (`e2e4`, `e7e8q`, castling as the
/// king's two-square move `e1g1`).
pub trait RulesProvider: Send {
    /// The side whose turn it is.
    fn side_to_move(&self) -> Side;

    /// The current position as FEN.
    fn fen(&self) -> String;

    /// All legal moves in the current position.
    fn legal_moves(&self) -> Vec<String>;

    /// Applies a move, leaving the position untouched if it is rejected.
    fn apply(&mut self, uci: &str) -> Result<(), RulesError>;

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    /// Appends a queen promotion to a pawn move onto the last rank that was
    /// given without a promotion piece. Other moves are returned unchanged.
    fn complete_promotion(&self, uci: &str) -> String;

    /// Returns true if the move is in the legal set.
    fn is_legal(&self, uci: &str) -> bool {
        self.legal_moves().iter().any(|m| m == uci)
    }

    /// Destination squares of the legal moves starting on `from` (`"e2"`).
    fn legal_targets(&self, from: &str) -> Vec<String> {
        let mut targets: Vec<String> = self
            .legal_moves()
            .iter()
            .filter(|m| m.starts_with(from) && m.len() >= 4)
            .map(|m| m[2..4].to_string())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    fn status(&self) -> BoardStatus {
        BoardStatus {
            check: self.is_check(),
            checkmate: self.is_checkmate(),
            stalemate: self.is_stalemate(),
        }
    }

    /// How the game ended, or `None` if it goes on.
    fn termination(&self) -> Option<Termination> {
        if self.is_checkmate() {
            Some(Termination::Checkmate {
                winner: self.side_to_move().opposite(),
            })
        } else if self.is_stalemate() {
            Some(Termination::Stalemate)
        } else {
            None
        }
    }
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Default)]
pub struct StandardRules {
    position: Chess,
}

impl StandardRules {
    /// The initial position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets up a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|_| RulesError::InvalidFen(fen.to_string()))?;
        let position = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| RulesError::InvalidFen(fen.to_string()))?;
        Ok(Self { position })
    }

    #[must_use]
    pub fn position(&self) -> &Chess {
        &self.position
    }
}

impl RulesProvider for StandardRules {
    fn side_to_move(&self) -> Side {
        self.position.turn().into()
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn legal_moves(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    fn apply(&mut self, uci: &str) -> Result<(), RulesError> {
        let parsed: UciMove = uci
            .parse()
            .map_err(|_| RulesError::InvalidUci(uci.to_string()))?;
        if !self.is_legal(uci) {
            return Err(RulesError::IllegalMove(uci.to_string()));
        }
        let m = parsed
            .to_move(&self.position)
            .map_err(|_| RulesError::IllegalMove(uci.to_string()))?;
        self.position.play_unchecked(&m);
        Ok(())
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn complete_promotion(&self, uci: &str) -> String {
        if uci.len() != 4 || !uci.is_ascii() {
            return uci.to_string();
        }
        let (Ok(from), Ok(to)) = (uci[0..2].parse::<Square>(), uci[2..4].parse::<Square>()) else {
            return uci.to_string();
        };

        let turn = self.position.turn();
        let is_own_pawn = self
            .position
            .board()
            .piece_at(from)
            .is_some_and(|piece| piece.role == Role::Pawn && piece.color == turn);
        let last_rank = match turn {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };

        if is_own_pawn && to.rank() == last_rank {
            format!("{uci}q")
        } else {
            uci.to_string()
        }
    }
}
