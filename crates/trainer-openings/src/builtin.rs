//! Built-in opening catalog.
//!
//! Four classical openings with five lines each, compiled into the binary so
//! the trainer works without a catalog file.

use crate::catalog::OpeningCatalog;
use crate::opening::{Opening, OpeningLine};

/// Creates the built-in catalog.
#[must_use]
pub fn builtin_catalog() -> OpeningCatalog {
    OpeningCatalog::with_openings(vec![
        ruy_lopez(),
        sicilian_defense(),
        french_defense(),
        queens_gambit(),
    ])
}

fn ruy_lopez() -> Opening {
    Opening::new(
        "Ruy Lopez",
        vec![
            OpeningLine::from_moves(
                "Ruy Lopez: Morphy Defense, Closed",
                &[
                    "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6", "e1g1",
                    "f8e7", "d2d4", "e5d4", "f3d4",
                ],
            ),
            OpeningLine::from_moves(
                "Ruy Lopez: Morphy Defense, Classical Defense",
                &[
                    "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "f8c5", "c2c3", "g8f6", "d2d4",
                    "c5d4", "c3d4",
                ],
            ),
            OpeningLine::from_moves(
                "Ruy Lopez: Steinitz Defense Deferred",
                &[
                    "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "d7d6", "d2d4", "c8d7", "c2c3",
                    "g8f6", "e1g1", "f6e4",
                ],
            ),
            OpeningLine::from_moves(
                "Ruy Lopez: Morphy Defense, Modern Steinitz Defense",
                &[
                    "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6", "e1g1",
                    "b7b5", "a4b3", "d7d6",
                ],
            ),
            OpeningLine::from_moves(
                "Ruy Lopez: Bird's Defense",
                &[
                    "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "g8f6", "d2d3", "d7d6", "b1c3",
                    "f6e4", "c3e4",
                ],
            ),
        ],
    )
}

fn sicilian_defense() -> Opening {
    Opening::new(
        "Sicilian Defense",
        vec![
            OpeningLine::from_moves(
                "Sicilian Defense: Najdorf Variation",
                &[
                    "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3",
                    "a7a6", "f1e2",
                ],
            ),
            OpeningLine::from_moves(
                "Sicilian Defense: Scheveningen Variation",
                &[
                    "e2e4", "c7c5", "g1f3", "e7e6", "d2d4", "c5d4", "f3d4", "a7a6", "b1c3",
                    "d8c7", "c1e3",
                ],
            ),
            OpeningLine::from_moves(
                "Sicilian Defense: Alapin Variation",
                &[
                    "e2e4", "c7c5", "d2d4", "c5d4", "c2c3", "d4c3", "b1c3", "g8f6", "f1d3",
                    "e7e5", "d1a4",
                ],
            ),
            OpeningLine::from_moves(
                "Sicilian Defense: Sozin Attack",
                &[
                    "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3",
                    "a7a6", "f2f4", "e7e5",
                ],
            ),
            OpeningLine::from_moves(
                "Sicilian Defense: Richter-Rauzer Attack",
                &[
                    "e2e4", "c7c5", "g1f3", "e7e6", "d2d4", "c5d4", "f3d4", "a7a6", "d4f3",
                    "g8f6", "c1g5",
                ],
            ),
        ],
    )
}

fn french_defense() -> Opening {
    Opening::new(
        "French Defense",
        vec![
            OpeningLine::from_moves(
                "French Defense: Winawer Variation",
                &[
                    "e2e4", "e7e6", "d2d4", "d7d5", "b1c3", "f8b4", "e4e5", "c7c5", "a2a3",
                    "b4a5", "g1f3",
                ],
            ),
            OpeningLine::from_moves(
                "French Defense: Classical Variation",
                &[
                    "e2e4", "e7e6", "d2d4", "d7d5", "b1d2", "g8f6", "e4e5", "f6d7", "f1d3",
                    "b8c6", "c2c3",
                ],
            ),
            // Ends with the recapture Bxd2; the light-squared bishop cannot reach d2.
            OpeningLine::from_moves(
                "French Defense: Rubinstein Variation",
                &[
                    "e2e4", "e7e6", "d2d4", "d7d5", "g1f3", "g8f6", "e4e5", "f6e4", "b1d2",
                    "e4d2", "c1d2",
                ],
            ),
            OpeningLine::from_moves(
                "French Defense: Steinitz Variation",
                &[
                    "e2e4", "e7e6", "d2d4", "d7d5", "b1c3", "c7c5", "g1f3", "g8f6", "c1g5",
                    "f8e7", "d4c5",
                ],
            ),
            OpeningLine::from_moves(
                "French Defense: Burn Variation",
                &[
                    "e2e4", "e7e6", "d2d4", "d7d5", "b1d2", "f8e7", "g1f3", "g8f6", "e4e5",
                    "f6e4", "c2c4",
                ],
            ),
        ],
    )
}

fn queens_gambit() -> Opening {
    Opening::new(
        "Queen's Gambit",
        vec![
            OpeningLine::from_moves(
                "Queen's Gambit Declined: Orthodox Defense",
                &[
                    "d2d4", "d7d5", "c2c4", "e7e6", "b1c3", "g8f6", "c1g5", "f8e7", "e2e3",
                    "e8g8", "f1d3",
                ],
            ),
            OpeningLine::from_moves(
                "Queen's Gambit Declined: Tartakower Defense",
                &[
                    "d2d4", "d7d5", "c2c4", "c7c6", "g1f3", "g8f6", "b1c3", "e7e6", "c1g5",
                    "h7h6", "g5f6",
                ],
            ),
            OpeningLine::from_moves(
                "Queen's Gambit Declined: Ragozin Defense",
                &[
                    "d2d4", "d7d5", "c2c4", "e7e6", "g1f3", "g8f6", "b1c3", "f8b4", "c1d2",
                    "e8g8", "e2e3", "b4c3",
                ],
            ),
            // Black supports the c4 pawn with e6 before White recaptures.
            OpeningLine::from_moves(
                "Queen's Gambit Accepted: Classical Defense",
                &[
                    "d2d4", "d7d5", "c2c4", "c7c6", "g1f3", "g8f6", "b1c3", "d5c4", "e2e3",
                    "e7e6", "f1c4",
                ],
            ),
            OpeningLine::from_moves(
                "Queen's Gambit Declined: Lasker Defense",
                &[
                    "d2d4", "d7d5", "c2c4", "e7e6", "b1c3", "g8f6", "c1g5", "h7h6", "g5f6",
                    "d8f6", "g1f3", "f6d8",
                ],
            ),
        ],
    )
}
