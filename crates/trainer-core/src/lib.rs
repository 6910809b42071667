//! Core of the opening trainer.
//!
//! - [`rules`] - The rules provider seam, backed by `shakmaty`
//! - [`dispatch`] - The turn dispatcher: scripted line, free play, engine turns
//! - [`session`] - [`GameSession`], the dispatcher and engine behind one lock,
//!   and the [`Snapshot`] the renderer paints from
//! - [`input`] - Pointer events to board squares and UCI moves
//!
//! The human always plays White and the engine always plays Black.

pub mod dispatch;
pub mod input;
pub mod rules;
pub mod session;

pub use dispatch::{
    replay_line, DispatchOutcome, DispatchState, Dispatcher, Mode, MoveReport, Notification,
    Reply, MAX_ENGINE_ATTEMPTS,
};
pub use input::{BoardGeometry, BoardSquare, PointerAction, PointerEvent, PointerTracker};
pub use rules::{BoardStatus, RulesError, RulesProvider, Side, StandardRules, Termination};
pub use session::{GameSession, Snapshot};
