//! Opening catalog for the opening trainer.
//!
//! A catalog maps opening names to one or more named lines, each an ordered
//! sequence of UCI moves played from the initial position. The trainer picks
//! one line of the chosen opening at random and drills it move by move.

pub mod builtin;
pub mod catalog;
pub mod opening;

pub use builtin::builtin_catalog;
pub use catalog::{CatalogError, OpeningCatalog};
pub use opening::{is_uci_move, Opening, OpeningLine};
