//! Sessions and engines shared by the unit tests.

use std::sync::Arc;

use trainer_core::{Dispatcher, GameSession, RulesProvider, StandardRules};
use trainer_engine::{Engine, EngineError, Evaluation};
use trainer_openings::OpeningLine;

/// Plays the first legal move and reports `+0.40`.
pub struct FixedEngine {
    fen: Option<String>,
}

impl FixedEngine {
    pub fn new() -> Self {
        Self { fen: None }
    }
}

impl Engine for FixedEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.fen = Some(fen.to_string());
        Ok(())
    }

    fn best_move(&mut self) -> Result<Option<String>, EngineError> {
        let fen = self.fen.as_deref().ok_or(EngineError::NoPosition)?;
        let rules = StandardRules::from_fen(fen)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        Ok(rules.legal_moves().into_iter().next())
    }

    fn evaluation(&mut self) -> Result<Evaluation, EngineError> {
        Ok(Evaluation::Centipawns(40))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

pub fn session(
    moves: &[&str],
    engine: FixedEngine,
) -> Arc<GameSession<StandardRules, FixedEngine>> {
    let line = OpeningLine::from_moves("Test Line", moves);
    let dispatcher = Dispatcher::new(StandardRules::new(), line);
    Arc::new(GameSession::new("Test Opening", dispatcher, engine))
}
