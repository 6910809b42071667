//! Input mapping: pointer positions to squares, clicks and drags to moves.
//!
//! Positions are terminal cells. The board is drawn with White at the bottom,
//! so row 0 of the grid is rank 8.

use std::fmt;

use crate::session::Snapshot;

/// Cells the pointer has to travel from the press point before a press
/// becomes a drag.
pub const DRAG_THRESHOLD: u16 = 2;

/// A square of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardSquare {
    /// 0 = file a.
    file: u8,
    /// 0 = rank 1.
    rank: u8,
}

impl BoardSquare {
    #[must_use]
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// The square at a grid position, row 0 being rank 8.
    #[must_use]
    pub fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row >= 8 || col >= 8 {
            return None;
        }
        Self::new(col as u8, 7 - row as u8)
    }

    /// Parses a square name like `e4`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].checked_sub(b'a')?;
        let rank = bytes[1].checked_sub(b'1')?;
        Self::new(file, rank)
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn row(&self) -> usize {
        usize::from(7 - self.rank)
    }

    #[must_use]
    pub fn col(&self) -> usize {
        usize::from(self.file)
    }

    /// True for the dark squares (a1, c1, ...).
    #[must_use]
    pub fn is_dark(&self) -> bool {
        (self.file + self.rank) % 2 == 0
    }
}

impl fmt::Display for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file), char::from(b'1' + self.rank))
    }
}

/// Where the board's squares are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    /// Column of the left edge of a8.
    pub x: u16,
    /// Row of the top edge of a8.
    pub y: u16,
    pub square_width: u16,
    pub square_height: u16,
}

impl BoardGeometry {
    #[must_use]
    pub fn new(x: u16, y: u16, square_width: u16, square_height: u16) -> Self {
        Self {
            x,
            y,
            square_width: square_width.max(1),
            square_height: square_height.max(1),
        }
    }

    /// Columns covered by the board, saturating at the terminal limit.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.square_width.saturating_mul(8)
    }

    /// Rows covered by the board, saturating at the terminal limit.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.square_height.saturating_mul(8)
    }

    #[must_use]
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && column < self.x.saturating_add(self.width())
            && row < self.y.saturating_add(self.height())
    }

    /// The square under a cell, if the cell is on the board.
    #[must_use]
    pub fn square_at(&self, column: u16, row: u16) -> Option<BoardSquare> {
        if !self.contains(column, row) {
            return None;
        }
        let col = (column - self.x) / self.square_width;
        let grid_row = (row - self.y) / self.square_height;
        BoardSquare::from_row_col(usize::from(grid_row), usize::from(col))
    }

    /// Top-left cell of a square.
    #[must_use]
    pub fn origin_of(&self, square: BoardSquare) -> (u16, u16) {
        (
            self.x
                .saturating_add((square.col() as u16).saturating_mul(self.square_width)),
            self.y
                .saturating_add((square.row() as u16).saturating_mul(self.square_height)),
        )
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self::new(0, 0, 7, 3)
    }
}

/// A pointer event in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Up { column: u16, row: u16 },
}

/// What the UI should do after a pointer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerAction {
    None,
    /// A piece was picked up; highlight its targets.
    Select {
        square: BoardSquare,
        targets: Vec<BoardSquare>,
    },
    Deselect,
    /// Submit this UCI move.
    Submit(String),
}

/// Click-to-move and drag-and-drop over the board.
///
/// Only White's pieces can be picked up, and only while White is to move.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    selected: Option<BoardSquare>,
    targets: Vec<BoardSquare>,
    press: Option<(u16, u16)>,
    dragging: bool,
    drag_position: Option<(u16, u16)>,
}

impl PointerTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<BoardSquare> {
        self.selected
    }

    #[must_use]
    pub fn targets(&self) -> &[BoardSquare] {
        &self.targets
    }

    /// The dragged piece's square and the cell it is held over.
    #[must_use]
    pub fn dragging(&self) -> Option<(BoardSquare, (u16, u16))> {
        if !self.dragging {
            return None;
        }
        Some((self.selected?, self.drag_position?))
    }

    /// Drops any selection, e.g. after the position changed.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        geometry: &BoardGeometry,
        snapshot: &Snapshot,
    ) -> PointerAction {
        match event {
            PointerEvent::Down { column, row } => self.on_down(column, row, geometry, snapshot),
            PointerEvent::Drag { column, row } => {
                self.on_drag(column, row);
                PointerAction::None
            }
            PointerEvent::Up { column, row } => self.on_up(column, row, geometry),
        }
    }

    fn on_down(
        &mut self,
        column: u16,
        row: u16,
        geometry: &BoardGeometry,
        snapshot: &Snapshot,
    ) -> PointerAction {
        self.press = Some((column, row));
        self.dragging = false;
        self.drag_position = None;

        let Some(square) = geometry.square_at(column, row) else {
            return self.deselect();
        };

        if let Some(from) = self.selected {
            if self.targets.contains(&square) {
                return self.submit(from, square);
            }
        }

        let own_piece = snapshot
            .piece_at(square)
            .is_some_and(|piece| piece.is_ascii_uppercase());
        if own_piece && snapshot.white_to_move() {
            self.selected = Some(square);
            self.targets = snapshot.targets_from(square);
            return PointerAction::Select {
                square,
                targets: self.targets.clone(),
            };
        }

        self.deselect()
    }

    fn on_drag(&mut self, column: u16, row: u16) {
        let (Some(_), Some((press_col, press_row))) = (self.selected, self.press) else {
            return;
        };
        if !self.dragging {
            let distance = column.abs_diff(press_col) + row.abs_diff(press_row);
            self.dragging = distance >= DRAG_THRESHOLD;
        }
        if self.dragging {
            self.drag_position = Some((column, row));
        }
    }

    fn on_up(&mut self, column: u16, row: u16, geometry: &BoardGeometry) -> PointerAction {
        let was_dragging = self.dragging;
        self.press = None;
        self.dragging = false;
        self.drag_position = None;

        let (Some(from), Some(square)) = (self.selected, geometry.square_at(column, row)) else {
            return PointerAction::None;
        };

        // Dropping a dragged piece, or releasing a click on a different target.
        if (was_dragging || square != from) && self.targets.contains(&square) {
            return self.submit(from, square);
        }
        PointerAction::None
    }

    fn submit(&mut self, from: BoardSquare, to: BoardSquare) -> PointerAction {
        self.clear();
        PointerAction::Submit(format!("{from}{to}"))
    }

    fn deselect(&mut self) -> PointerAction {
        if self.selected.take().is_some() {
            self.targets.clear();
            PointerAction::Deselect
        } else {
            PointerAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use trainer_engine::EvaluationPair;

    use super::*;
    use crate::dispatch::{DispatchState, Mode};
    use crate::rules::{RulesProvider, Side, StandardRules};
    use crate::session::legal_targets_by_square;

    fn snapshot_of(rules: &StandardRules) -> Snapshot {
        Snapshot {
            opening: "Test".to_string(),
            line_name: "Test Line".to_string(),
            line_len: 0,
            state: DispatchState {
                mode: Mode::FreePlay,
                cursor: 0,
                side_to_move: rules.side_to_move(),
            },
            fen: rules.fen(),
            targets: legal_targets_by_square(rules),
            status: rules.status(),
            termination: rules.termination(),
            evaluation: EvaluationPair::neutral(),
            last_move: None,
        }
    }

    fn sq(name: &str) -> BoardSquare {
        BoardSquare::parse(name).unwrap()
    }

    /// Centre cell of a square.
    fn centre(geometry: &BoardGeometry, name: &str) -> (u16, u16) {
        let (x, y) = geometry.origin_of(sq(name));
        (x + geometry.square_width / 2, y + geometry.square_height / 2)
    }

    fn down(at: (u16, u16)) -> PointerEvent {
        PointerEvent::Down { column: at.0, row: at.1 }
    }

    fn drag(at: (u16, u16)) -> PointerEvent {
        PointerEvent::Drag { column: at.0, row: at.1 }
    }

    fn up(at: (u16, u16)) -> PointerEvent {
        PointerEvent::Up { column: at.0, row: at.1 }
    }

    #[test]
    fn test_square_names() {
        assert_eq!(sq("a1").name(), "a1");
        assert_eq!(sq("h8").to_string(), "h8");
        assert_eq!(sq("e2").row(), 6);
        assert_eq!(sq("e2").col(), 4);
        assert!(sq("a1").is_dark());
        assert!(!sq("h1").is_dark());
        assert!(BoardSquare::parse("i1").is_none());
        assert!(BoardSquare::parse("a9").is_none());
        assert!(BoardSquare::parse("a").is_none());
        assert_eq!(BoardSquare::from_row_col(0, 0), Some(sq("a8")));
        assert_eq!(BoardSquare::from_row_col(7, 7), Some(sq("h1")));
        assert_eq!(BoardSquare::from_row_col(8, 0), None);
    }

    #[test]
    fn test_geometry_square_at() {
        let geometry = BoardGeometry::new(2, 1, 7, 3);
        assert_eq!(geometry.square_at(2, 1), Some(sq("a8")));
        assert_eq!(geometry.square_at(8, 3), Some(sq("a8")));
        assert_eq!(geometry.square_at(9, 1), Some(sq("b8")));
        assert_eq!(geometry.square_at(2 + 7 * 8 - 1, 1 + 3 * 8 - 1), Some(sq("h1")));
        assert_eq!(geometry.square_at(1, 1), None);
        assert_eq!(geometry.square_at(2, 0), None);
        assert_eq!(geometry.square_at(2 + 7 * 8, 1), None);
        assert_eq!(geometry.origin_of(sq("e2")), (2 + 4 * 7, 1 + 6 * 3));
    }

    #[test]
    fn test_oversized_geometry_saturates() {
        let geometry = BoardGeometry::new(0, 0, 9000, 3);
        assert_eq!(geometry.width(), u16::MAX);
        assert!(geometry.contains(5, 5));
        assert_eq!(geometry.square_at(5, 5), Some(sq("a7")));
        assert_eq!(geometry.origin_of(sq("h1")), (63_000, 21));

        let far = BoardGeometry::new(u16::MAX - 4, u16::MAX - 1, 7, 3);
        assert!(far.contains(u16::MAX - 1, u16::MAX - 1));
        assert_eq!(far.origin_of(sq("h1")), (u16::MAX, u16::MAX));
    }

    #[test]
    fn test_click_select_then_click_target() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        let action = tracker.handle(down(centre(&geometry, "e2")), &geometry, &snapshot);
        assert_eq!(
            action,
            PointerAction::Select {
                square: sq("e2"),
                targets: vec![sq("e3"), sq("e4")],
            }
        );
        assert_eq!(
            tracker.handle(up(centre(&geometry, "e2")), &geometry, &snapshot),
            PointerAction::None
        );
        assert_eq!(tracker.selected(), Some(sq("e2")));

        let action = tracker.handle(down(centre(&geometry, "e4")), &geometry, &snapshot);
        assert_eq!(action, PointerAction::Submit("e2e4".to_string()));
        assert_eq!(tracker.selected(), None);
        assert!(tracker.targets().is_empty());
    }

    #[test]
    fn test_click_elsewhere_deselects() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        tracker.handle(down(centre(&geometry, "g1")), &geometry, &snapshot);
        tracker.handle(up(centre(&geometry, "g1")), &geometry, &snapshot);
        let action = tracker.handle(down(centre(&geometry, "d5")), &geometry, &snapshot);
        assert_eq!(action, PointerAction::Deselect);
        assert_eq!(tracker.selected(), None);

        // Off the board with nothing selected.
        let action = tracker.handle(down((200, 200)), &geometry, &snapshot);
        assert_eq!(action, PointerAction::None);
    }

    #[test]
    fn test_click_other_own_piece_reselects() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        tracker.handle(down(centre(&geometry, "e2")), &geometry, &snapshot);
        tracker.handle(up(centre(&geometry, "e2")), &geometry, &snapshot);
        let action = tracker.handle(down(centre(&geometry, "b1")), &geometry, &snapshot);
        assert_eq!(
            action,
            PointerAction::Select {
                square: sq("b1"),
                targets: vec![sq("a3"), sq("c3")],
            }
        );
    }

    #[test]
    fn test_black_pieces_cannot_be_selected() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();
        let action = tracker.handle(down(centre(&geometry, "e7")), &geometry, &snapshot);
        assert_eq!(action, PointerAction::None);
    }

    #[test]
    fn test_no_selection_on_black_turn() {
        let mut rules = StandardRules::new();
        rules.apply("e2e4").unwrap();
        let snapshot = snapshot_of(&rules);
        assert_eq!(snapshot.state.side_to_move, Side::Black);

        let geometry = BoardGeometry::default();
        let mut tracker = PointerTracker::new();
        let action = tracker.handle(down(centre(&geometry, "d2")), &geometry, &snapshot);
        assert_eq!(action, PointerAction::None);
    }

    #[test]
    fn test_drag_and_drop() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        let start = centre(&geometry, "g1");
        tracker.handle(down(start), &geometry, &snapshot);
        tracker.handle(drag((start.0 + 1, start.1)), &geometry, &snapshot);
        assert!(tracker.dragging().is_none());

        let over = centre(&geometry, "f3");
        tracker.handle(drag(over), &geometry, &snapshot);
        assert_eq!(tracker.dragging(), Some((sq("g1"), over)));

        let action = tracker.handle(up(over), &geometry, &snapshot);
        assert_eq!(action, PointerAction::Submit("g1f3".to_string()));
        assert!(tracker.dragging().is_none());
    }

    #[test]
    fn test_drop_on_illegal_square_keeps_selection() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        tracker.handle(down(centre(&geometry, "g1")), &geometry, &snapshot);
        let over = centre(&geometry, "g4");
        tracker.handle(drag(over), &geometry, &snapshot);
        assert_eq!(tracker.handle(up(over), &geometry, &snapshot), PointerAction::None);
        assert_eq!(tracker.selected(), Some(sq("g1")));
        assert!(tracker.dragging().is_none());
    }

    #[test]
    fn test_drag_without_selection_is_ignored() {
        let geometry = BoardGeometry::default();
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        tracker.handle(down(centre(&geometry, "e4")), &geometry, &snapshot);
        tracker.handle(drag(centre(&geometry, "e6")), &geometry, &snapshot);
        assert!(tracker.dragging().is_none());
    }

    #[test]
    fn test_short_release_on_target_submits() {
        let geometry = BoardGeometry::new(0, 0, 1, 1);
        let snapshot = snapshot_of(&StandardRules::new());
        let mut tracker = PointerTracker::new();

        // One-cell squares: e2 is (4, 6), e3 is (4, 5); one cell is below the drag threshold.
        tracker.handle(down((4, 6)), &geometry, &snapshot);
        tracker.handle(drag((4, 5)), &geometry, &snapshot);
        assert!(tracker.dragging().is_none());
        let action = tracker.handle(up((4, 5)), &geometry, &snapshot);
        assert_eq!(action, PointerAction::Submit("e2e3".to_string()));
    }
}
