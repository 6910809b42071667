//! The turn dispatcher.
//!
//! [`Dispatcher`] is the single source of truth for whose turn it is and in
//! what mode. While the opening line lasts, White's moves must follow the
//! line and Black's scripted replies are played immediately. Once the line is
//! exhausted the game continues as free play against the engine.

use tracing::{info, warn};
use trainer_engine::Engine;
use trainer_openings::OpeningLine;

use crate::rules::{RulesError, RulesProvider, Side, Termination};

/// Engine proposals tried per Black turn before giving up.
pub const MAX_ENGINE_ATTEMPTS: usize = 3;

/// Whether moves still follow the opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Opening,
    FreePlay,
}

/// What the renderer needs to know about the turn structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchState {
    pub mode: Mode,
    /// Index of the next line move; never decreases, never exceeds the line length.
    pub cursor: usize,
    pub side_to_move: Side,
}

/// Black's answer to an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The next move of the opening line.
    Scripted(String),
    /// A move chosen by the engine.
    Engine(String),
}

impl Reply {
    #[must_use]
    pub fn uci(&self) -> &str {
        match self {
            Reply::Scripted(mv) | Reply::Engine(mv) => mv,
        }
    }
}

/// Result of submitting a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The position moved on; both plies of an exchange are applied.
    Advanced {
        human: Option<String>,
        reply: Option<Reply>,
        fen: String,
    },
    /// The move does not follow the opening line. Nothing changed.
    WrongOpeningMove { expected: String, played: String },
    /// The move is not legal. Nothing changed.
    IllegalMove { attempted: String },
    /// It is Black's turn. Nothing changed.
    NotYourTurn,
    /// The engine never produced a move; Black's turn is pending.
    EngineNoMove,
    /// The engine only produced unusable moves; Black's turn is pending.
    EngineStalled { attempts: usize },
    /// The game has ended.
    GameOver(Termination),
}

/// Follow-up work requested from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Ask the engine for a fresh evaluation.
    Reevaluate,
    /// Redraw the board.
    Repaint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: DispatchOutcome,
    pub notifications: Vec<Notification>,
}

impl MoveReport {
    fn unchanged(outcome: DispatchOutcome) -> Self {
        Self {
            outcome,
            notifications: Vec::new(),
        }
    }

    /// A move was applied, including one that ended the game.
    fn changed(outcome: DispatchOutcome) -> Self {
        Self {
            outcome,
            notifications: vec![Notification::Repaint, Notification::Reevaluate],
        }
    }

    #[must_use]
    pub fn requests(&self, notification: Notification) -> bool {
        self.notifications.contains(&notification)
    }
}

enum EngineTurn {
    Played(String),
    NoMove,
    Stalled(usize),
}

/// Drives one training game.
pub struct Dispatcher<R> {
    rules: R,
    line: OpeningLine,
    cursor: usize,
    mode: Mode,
    termination: Option<Termination>,
    last_move: Option<String>,
}

impl<R: RulesProvider> Dispatcher<R> {
    /// Starts a game from the rules' current position.
    ///
    /// An empty line starts directly in free play.
    pub fn new(rules: R, line: OpeningLine) -> Self {
        let mode = if line.is_empty() {
            Mode::FreePlay
        } else {
            Mode::Opening
        };
        let termination = rules.termination();
        Self {
            rules,
            line,
            cursor: 0,
            mode,
            termination,
            last_move: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        DispatchState {
            mode: self.mode,
            cursor: self.cursor,
            side_to_move: self.rules.side_to_move(),
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn line(&self) -> &OpeningLine {
        &self.line
    }

    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// The last move applied by either side.
    #[must_use]
    pub fn last_move(&self) -> Option<&str> {
        self.last_move.as_deref()
    }

    /// Submits a move for White.
    ///
    /// Rejections leave the position and the dispatch state untouched and
    /// carry no notifications.
    pub fn submit_move<E: Engine + ?Sized>(&mut self, uci: &str, engine: &mut E) -> MoveReport {
        if let Some(termination) = self.termination {
            return MoveReport::unchanged(DispatchOutcome::GameOver(termination));
        }
        if self.rules.side_to_move() != Side::White {
            warn!(uci, "move submitted while Black is to move");
            return MoveReport::unchanged(DispatchOutcome::NotYourTurn);
        }

        let uci = self.rules.complete_promotion(uci.trim());
        match self.mode {
            Mode::Opening => self.submit_opening_move(uci, engine),
            Mode::FreePlay => self.submit_free_move(uci, engine),
        }
    }

    /// Plays Black's pending turn after `EngineNoMove` or `EngineStalled`.
    ///
    /// Returns `None` when Black is not to move or the game is over.
    pub fn resume_engine<E: Engine + ?Sized>(&mut self, engine: &mut E) -> Option<MoveReport> {
        if self.termination.is_some() || self.rules.side_to_move() != Side::Black {
            return None;
        }
        Some(self.engine_reply(None, engine))
    }

    fn submit_opening_move<E: Engine + ?Sized>(&mut self, uci: String, engine: &mut E) -> MoveReport {
        let Some(expected) = self.line.get(self.cursor).map(str::to_string) else {
            self.enter_free_play();
            return self.submit_free_move(uci, engine);
        };

        if uci != expected {
            warn!(played = %uci, expected = %expected, "move does not follow the line");
            return MoveReport::unchanged(DispatchOutcome::WrongOpeningMove {
                expected,
                played: uci,
            });
        }

        if let Err(e) = self.rules.apply(&uci) {
            warn!(error = %e, "line move rejected by the rules");
            return MoveReport::unchanged(DispatchOutcome::IllegalMove { attempted: uci });
        }
        self.cursor += 1;
        self.last_move = Some(uci.clone());

        if let Some(termination) = self.check_termination() {
            self.enter_free_play_if_exhausted();
            return MoveReport::changed(DispatchOutcome::GameOver(termination));
        }

        let reply = match self.line.get(self.cursor).map(str::to_string) {
            Some(scripted) => match self.rules.apply(&scripted) {
                Ok(()) => {
                    self.cursor += 1;
                    self.last_move = Some(scripted.clone());
                    Some(Reply::Scripted(scripted))
                }
                Err(e) => {
                    warn!(error = %e, line = %self.line.name, "scripted reply rejected, abandoning the line");
                    self.enter_free_play();
                    None
                }
            },
            None => None,
        };
        self.enter_free_play_if_exhausted();

        match reply {
            Some(reply) => {
                if let Some(termination) = self.check_termination() {
                    return MoveReport::changed(DispatchOutcome::GameOver(termination));
                }
                MoveReport::changed(DispatchOutcome::Advanced {
                    human: Some(uci),
                    reply: Some(reply),
                    fen: self.rules.fen(),
                })
            }
            // The line ended on White's move: the engine answers now.
            None => self.engine_reply(Some(uci), engine),
        }
    }

    fn submit_free_move<E: Engine + ?Sized>(&mut self, uci: String, engine: &mut E) -> MoveReport {
        if !self.rules.is_legal(&uci) {
            warn!(uci = %uci, "illegal move");
            return MoveReport::unchanged(DispatchOutcome::IllegalMove { attempted: uci });
        }
        if let Err(e) = self.rules.apply(&uci) {
            warn!(error = %e, "move rejected by the rules");
            return MoveReport::unchanged(DispatchOutcome::IllegalMove { attempted: uci });
        }
        self.last_move = Some(uci.clone());

        if let Some(termination) = self.check_termination() {
            return MoveReport::changed(DispatchOutcome::GameOver(termination));
        }

        if self.rules.side_to_move() == Side::Black {
            self.engine_reply(Some(uci), engine)
        } else {
            MoveReport::changed(DispatchOutcome::Advanced {
                human: Some(uci),
                reply: None,
                fen: self.rules.fen(),
            })
        }
    }

    /// Lets the engine play Black. `human` is White's move applied in the
    /// same call, if any; without it a failed engine turn changes nothing.
    fn engine_reply<E: Engine + ?Sized>(&mut self, human: Option<String>, engine: &mut E) -> MoveReport {
        let applied_human = human.is_some();
        let outcome = match self.play_engine_turn(engine) {
            EngineTurn::Played(mv) => {
                if let Some(termination) = self.check_termination() {
                    return MoveReport::changed(DispatchOutcome::GameOver(termination));
                }
                DispatchOutcome::Advanced {
                    human,
                    reply: Some(Reply::Engine(mv)),
                    fen: self.rules.fen(),
                }
            }
            EngineTurn::NoMove => DispatchOutcome::EngineNoMove,
            EngineTurn::Stalled(attempts) => DispatchOutcome::EngineStalled { attempts },
        };

        if matches!(outcome, DispatchOutcome::Advanced { .. }) || applied_human {
            MoveReport::changed(outcome)
        } else {
            MoveReport::unchanged(outcome)
        }
    }

    fn play_engine_turn<E: Engine + ?Sized>(&mut self, engine: &mut E) -> EngineTurn {
        let mut attempts = 0;
        let mut produced_move = false;

        while self.rules.side_to_move() == Side::Black && attempts < MAX_ENGINE_ATTEMPTS {
            attempts += 1;
            let fen = self.rules.fen();
            let proposal = engine
                .set_position(&fen)
                .and_then(|()| engine.best_move());

            match proposal {
                Ok(Some(mv)) => {
                    produced_move = true;
                    let mv = self.rules.complete_promotion(&mv);
                    match self.rules.apply(&mv) {
                        Ok(()) => {
                            self.last_move = Some(mv.clone());
                            return EngineTurn::Played(mv);
                        }
                        Err(e) => warn!(attempt = attempts, error = %e, "engine proposed an unusable move"),
                    }
                }
                Ok(None) => warn!(attempt = attempts, "engine returned no move"),
                Err(e) => warn!(attempt = attempts, error = %e, "engine query failed"),
            }
        }

        if produced_move {
            EngineTurn::Stalled(attempts)
        } else {
            EngineTurn::NoMove
        }
    }

    fn check_termination(&mut self) -> Option<Termination> {
        if self.termination.is_none() {
            self.termination = self.rules.termination();
            if let Some(termination) = self.termination {
                info!(%termination, "game over");
            }
        }
        self.termination
    }

    fn enter_free_play_if_exhausted(&mut self) {
        if self.cursor >= self.line.len() {
            self.enter_free_play();
        }
    }

    fn enter_free_play(&mut self) {
        if self.mode == Mode::Opening {
            info!(line = %self.line.name, cursor = self.cursor, "switching to free play");
            self.mode = Mode::FreePlay;
        }
    }
}

/// Replays a line from the rules' position, refusing lines with a move that
/// is illegal where it occurs.
pub fn replay_line<R: RulesProvider>(mut rules: R, line: &OpeningLine) -> Result<R, RulesError> {
    for (index, mv) in line.moves.iter().enumerate() {
        rules.apply(mv).map_err(|_| RulesError::IllegalLine {
            line: line.name.clone(),
            index,
            mv: mv.clone(),
        })?;
    }
    Ok(rules)
}
