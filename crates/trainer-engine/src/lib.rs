//! Engine collaborator for the opening trainer.
//!
//! # Overview
//!
//! - [`Engine`] - The narrow interface the trainer needs from an engine:
//!   set a position, get a best move, get an evaluation
//! - [`UciEngine`] - A long-lived UCI process (Stockfish by default)
//! - [`Evaluation`] - Centipawn or mate score, always from White's view
//! - [`EvaluationPair`] - The White and Black views shown by the renderer

pub mod engine;
pub mod evaluation;

pub use engine::{
    Engine, EngineError, EngineOptions, SearchResult, UciConnection, UciEngine, MAX_UCI_LINES,
};
pub use evaluation::{Evaluation, EvaluationPair};
