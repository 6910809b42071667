//! The shared game session.
//!
//! A [`GameSession`] owns the dispatcher (and through it the position) and
//! the engine behind a single mutex. Every operation takes the lock once and
//! runs to completion, so a reader never sees half of a scripted exchange.
//! The UI paints from [`Snapshot`]s instead of holding the lock.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::warn;
use trainer_engine::{Engine, EvaluationPair};

use crate::dispatch::{DispatchState, Dispatcher, MoveReport};
use crate::input::BoardSquare;
use crate::rules::{BoardStatus, RulesProvider, Side, Termination};

struct SessionState<R, E> {
    dispatcher: Dispatcher<R>,
    engine: E,
    evaluation: EvaluationPair,
    /// The evaluation covers the final position of a finished game.
    settled: bool,
}

/// One training game shared between the UI and the worker.
pub struct GameSession<R, E> {
    opening: String,
    inner: Mutex<SessionState<R, E>>,
}

impl<R: RulesProvider, E: Engine> GameSession<R, E> {
    pub fn new(opening: impl Into<String>, dispatcher: Dispatcher<R>, engine: E) -> Self {
        Self {
            opening: opening.into(),
            inner: Mutex::new(SessionState {
                dispatcher,
                engine,
                evaluation: EvaluationPair::neutral(),
                settled: false,
            }),
        }
    }

    /// Submits White's move; see [`Dispatcher::submit_move`].
    pub fn submit_move(&self, uci: &str) -> MoveReport {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        state.dispatcher.submit_move(uci, &mut state.engine)
    }

    /// Retries a pending engine turn; `None` if there is nothing to retry.
    pub fn retry_engine(&self) -> Option<MoveReport> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        state.dispatcher.resume_engine(&mut state.engine)
    }

    /// Asks the engine to evaluate the current position.
    ///
    /// A failed query resets both evaluations to zero. Once the game has
    /// ended the final position is evaluated once; later calls keep that
    /// evaluation without consulting the engine.
    pub fn refresh_evaluation(&self) -> EvaluationPair {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.settled {
            return state.evaluation;
        }

        let fen = state.dispatcher.rules().fen();
        let result = state
            .engine
            .set_position(&fen)
            .and_then(|()| state.engine.evaluation());

        state.evaluation = match result {
            Ok(white) => EvaluationPair::from_white(white),
            Err(e) => {
                warn!(error = %e, "evaluation failed, showing an even position");
                EvaluationPair::neutral()
            }
        };
        state.settled = state.dispatcher.termination().is_some();
        state.evaluation
    }

    /// Captures everything the renderer needs, waiting for the lock.
    pub fn snapshot(&self) -> Snapshot {
        let guard = self.inner.lock();
        Snapshot::capture(&self.opening, &guard)
    }
}

/// A consistent, owned copy of the session state for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub opening: String,
    pub line_name: String,
    pub line_len: usize,
    pub state: DispatchState,
    pub fen: String,
    /// Destination squares of the legal moves, by origin square.
    pub targets: BTreeMap<BoardSquare, Vec<BoardSquare>>,
    pub status: BoardStatus,
    pub termination: Option<Termination>,
    pub evaluation: EvaluationPair,
    pub last_move: Option<String>,
}

impl Snapshot {
    fn capture<R: RulesProvider, E>(opening: &str, state: &SessionState<R, E>) -> Self {
        let dispatcher = &state.dispatcher;
        let rules = dispatcher.rules();
        Self {
            opening: opening.to_string(),
            line_name: dispatcher.line().name.clone(),
            line_len: dispatcher.line().len(),
            state: dispatcher.state(),
            fen: rules.fen(),
            targets: legal_targets_by_square(rules),
            status: rules.status(),
            termination: dispatcher.termination(),
            evaluation: state.evaluation,
            last_move: dispatcher.last_move().map(str::to_string),
        }
    }

    /// Line moves not yet played.
    #[must_use]
    pub fn remaining_moves(&self) -> usize {
        self.line_len.saturating_sub(self.state.cursor)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.termination.is_some()
    }

    /// True when the human may move.
    #[must_use]
    pub fn white_to_move(&self) -> bool {
        self.state.side_to_move == Side::White && !self.is_over()
    }

    /// Squares a piece on `from` may move to.
    #[must_use]
    pub fn targets_from(&self, from: BoardSquare) -> Vec<BoardSquare> {
        self.targets.get(&from).cloned().unwrap_or_default()
    }

    /// FEN piece letter on a square (`P` white pawn, `k` black king).
    #[must_use]
    pub fn piece_at(&self, square: BoardSquare) -> Option<char> {
        self.board()[square.row()][square.col()]
    }

    /// Pieces by `[row][col]`, row 0 being rank 8.
    #[must_use]
    pub fn board(&self) -> [[Option<char>; 8]; 8] {
        let mut board = [[None; 8]; 8];
        let placement = self.fen.split_whitespace().next().unwrap_or("");
        for (row, rank) in placement.split('/').take(8).enumerate() {
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else if col < 8 {
                    board[row][col] = Some(c);
                    col += 1;
                }
            }
        }
        board
    }

    /// The from and to squares of the last move.
    #[must_use]
    pub fn last_move_squares(&self) -> Option<(BoardSquare, BoardSquare)> {
        let mv = self.last_move.as_deref()?;
        Some((
            BoardSquare::parse(mv.get(0..2)?)?,
            BoardSquare::parse(mv.get(2..4)?)?,
        ))
    }
}

/// Every square with a legal move, mapped to the squares it can reach.
pub(crate) fn legal_targets_by_square<R: RulesProvider>(
    rules: &R,
) -> BTreeMap<BoardSquare, Vec<BoardSquare>> {
    let mut origins: Vec<BoardSquare> = rules
        .legal_moves()
        .iter()
        .filter_map(|m| m.get(0..2).and_then(BoardSquare::parse))
        .collect();
    origins.sort_unstable();
    origins.dedup();

    origins
        .into_iter()
        .map(|from| {
            let targets = rules
                .legal_targets(&from.name())
                .iter()
                .filter_map(|to| BoardSquare::parse(to))
                .collect();
            (from, targets)
        })
        .collect()
}
