//! Engines used by the session tests.

#![allow(dead_code)]

use trainer_core::{RulesProvider, Side, StandardRules};
use trainer_engine::{Engine, EngineError, Evaluation};
use uci::Score;

/// Plays the first legal move and reports a fixed evaluation, or `mate 0`
/// once the side to move is mated.
pub struct FirstLegalEngine {
    fen: Option<String>,
    pub evaluation: Evaluation,
    pub moves_played: usize,
}

impl FirstLegalEngine {
    pub fn new() -> Self {
        Self {
            fen: None,
            evaluation: Evaluation::Centipawns(25),
            moves_played: 0,
        }
    }
}

impl Engine for FirstLegalEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.fen = Some(fen.to_string());
        Ok(())
    }

    fn best_move(&mut self) -> Result<Option<String>, EngineError> {
        let fen = self.fen.as_deref().ok_or(EngineError::NoPosition)?;
        let rules = StandardRules::from_fen(fen)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        let mv = rules.legal_moves().into_iter().next();
        if mv.is_some() {
            self.moves_played += 1;
        }
        Ok(mv)
    }

    fn evaluation(&mut self) -> Result<Evaluation, EngineError> {
        let fen = self.fen.as_deref().ok_or(EngineError::NoPosition)?;
        let rules = StandardRules::from_fen(fen)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        if rules.is_checkmate() {
            let white_to_move = rules.side_to_move() == Side::White;
            return Ok(Evaluation::from_score(&Score::Mate(0), white_to_move));
        }
        Ok(self.evaluation)
    }

    fn name(&self) -> &str {
        "first-legal"
    }
}

/// Every query fails as if the process had died.
pub struct BrokenEngine;

impl Engine for BrokenEngine {
    fn set_position(&mut self, _fen: &str) -> Result<(), EngineError> {
        Ok(())
    }

    fn best_move(&mut self) -> Result<Option<String>, EngineError> {
        Err(EngineError::Closed)
    }

    fn evaluation(&mut self) -> Result<Evaluation, EngineError> {
        Err(EngineError::Closed)
    }

    fn name(&self) -> &str {
        "broken"
    }
}
