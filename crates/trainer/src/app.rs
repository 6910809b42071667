//! UI state of a training game.
//!
//! [`App`] turns terminal events into [`AppAction`]s for the main loop and
//! folds [`WorkerEvent`]s back into what is shown. It never touches the
//! session itself; the board it shows is the last [`Snapshot`] received.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::{debug, info, warn};
use trainer_core::{
    BoardGeometry, BoardSquare, DispatchOutcome, Mode, MoveReport, PointerAction, PointerEvent,
    PointerTracker, Reply, Snapshot,
};

use crate::worker::WorkerEvent;

/// Longest text the move prompt accepts (`e7e8q`).
const MAX_TYPED_LEN: usize = 5;

/// What the main loop should do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Submit(String),
    RetryEngine,
    SaveSnapshot,
    Quit,
}

pub struct App {
    snapshot: Snapshot,
    pointer: PointerTracker,
    geometry: BoardGeometry,
    typed: String,
    message: Option<String>,
    /// A move is with the worker; further moves wait for its report.
    pending: bool,
}

impl App {
    #[must_use]
    pub fn new(snapshot: Snapshot, geometry: BoardGeometry) -> Self {
        Self {
            snapshot,
            pointer: PointerTracker::new(),
            geometry,
            typed: String::new(),
            message: None,
            pending: false,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    /// Moves the board, keeping the square size. Called by the renderer
    /// once the layout is known.
    pub fn place_board(&mut self, x: u16, y: u16) {
        self.geometry.x = x;
        self.geometry.y = y;
    }

    #[must_use]
    pub fn selected(&self) -> Option<BoardSquare> {
        self.pointer.selected()
    }

    #[must_use]
    pub fn targets(&self) -> &[BoardSquare] {
        self.pointer.targets()
    }

    #[must_use]
    pub fn dragging(&self) -> Option<(BoardSquare, (u16, u16))> {
        self.pointer.dragging()
    }

    #[must_use]
    pub fn typed(&self) -> &str {
        &self.typed
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn handle_event(&mut self, event: &Event) -> AppAction {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => AppAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        match key.code {
            KeyCode::Esc => {
                self.typed.clear();
                self.pointer.clear();
                AppAction::None
            }
            KeyCode::Backspace => {
                self.typed.pop();
                AppAction::None
            }
            KeyCode::Enter => {
                let mv = self.typed.trim().to_ascii_lowercase();
                self.typed.clear();
                if mv.is_empty() {
                    AppAction::None
                } else {
                    self.submit(mv)
                }
            }
            // Command keys only with an empty prompt; `q`, `r` also name promotion pieces.
            KeyCode::Char('q') if self.typed.is_empty() => AppAction::Quit,
            KeyCode::Char('r') if self.typed.is_empty() => {
                if self.pending {
                    AppAction::None
                } else {
                    self.pending = true;
                    AppAction::RetryEngine
                }
            }
            KeyCode::Char('s') if self.typed.is_empty() => AppAction::SaveSnapshot,
            KeyCode::Char(c) if c.is_ascii_alphanumeric() => {
                if self.typed.len() < MAX_TYPED_LEN {
                    self.typed.push(c.to_ascii_lowercase());
                }
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> AppAction {
        let (column, row) = (mouse.column, mouse.row);
        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEvent::Down { column, row },
            MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Drag { column, row },
            MouseEventKind::Up(MouseButton::Left) => PointerEvent::Up { column, row },
            _ => return AppAction::None,
        };

        match self.pointer.handle(event, &self.geometry, &self.snapshot) {
            PointerAction::Submit(mv) => self.submit(mv),
            PointerAction::Select { square, targets } => {
                debug!(%square, targets = targets.len(), "piece selected");
                AppAction::None
            }
            PointerAction::Deselect | PointerAction::None => AppAction::None,
        }
    }

    fn submit(&mut self, mv: String) -> AppAction {
        if self.pending {
            self.set_message("Waiting for the engine");
            return AppAction::None;
        }
        // Promotions default to a queen; the rules layer fills in the piece.
        self.pending = true;
        AppAction::Submit(mv)
    }

    /// Folds a worker result into the displayed state.
    pub fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Dispatched { report, snapshot } => {
                self.pending = false;
                if let Some(message) = describe(&report) {
                    self.message = Some(message);
                }
                if self.snapshot.state.mode == Mode::Opening
                    && snapshot.state.mode == Mode::FreePlay
                {
                    info!(line = %snapshot.line_name, "opening line complete");
                    self.message = Some(match self.message.take() {
                        Some(m) => format!("{m}. Line complete, playing the engine"),
                        None => "Line complete, playing the engine".to_string(),
                    });
                }
                self.update_snapshot(snapshot);
            }
            WorkerEvent::NothingToRetry => {
                self.pending = false;
                self.set_message("Nothing to retry");
            }
            WorkerEvent::Evaluated(snapshot) => self.update_snapshot(snapshot),
        }
    }

    fn update_snapshot(&mut self, snapshot: Snapshot) {
        if snapshot.fen != self.snapshot.fen {
            self.pointer.clear();
        }
        self.snapshot = snapshot;
    }
}

/// The user-facing message for a dispatch result.
#[must_use]
pub fn describe(report: &MoveReport) -> Option<String> {
    let message = match &report.outcome {
        DispatchOutcome::Advanced { human, reply, .. } => {
            let reply = reply.as_ref().map(|reply| match reply {
                Reply::Scripted(mv) => format!("Black replied {mv}"),
                Reply::Engine(mv) => format!("Engine played {mv}"),
            });
            match (human, reply) {
                (Some(human), Some(reply)) => format!("You played {human}. {reply}"),
                (Some(human), None) => format!("You played {human}"),
                (None, Some(reply)) => reply,
                (None, None) => return None,
            }
        }
        DispatchOutcome::WrongOpeningMove { expected, played } => {
            warn!(%expected, %played, "move off the opening line");
            format!("Incorrect move. Expected: {expected}, but got: {played}")
        }
        DispatchOutcome::IllegalMove { attempted } => {
            warn!(%attempted, "illegal move");
            format!("Illegal move: {attempted}")
        }
        DispatchOutcome::NotYourTurn => "Not your turn. Press r to retry the engine".to_string(),
        DispatchOutcome::EngineNoMove => "The engine did not move. Press r to retry".to_string(),
        DispatchOutcome::EngineStalled { attempts } => {
            format!("The engine found no legal move in {attempts} attempts. Press r to retry")
        }
        DispatchOutcome::GameOver(termination) => termination.to_string(),
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, FixedEngine};
    use trainer_core::Notification;

    fn app() -> App {
        let session = session(&["e2e4", "e7e5", "g1f3", "b8c6"], FixedEngine::new());
        App::new(session.snapshot(), BoardGeometry::default())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert_eq!(app.handle_event(&key(KeyCode::Char(c))), AppAction::None);
        }
    }

    #[test]
    fn test_typed_move_submits_on_enter() {
        let mut app = app();
        type_text(&mut app, "E2e4");
        assert_eq!(app.typed(), "e2e4");
        assert_eq!(
            app.handle_event(&key(KeyCode::Enter)),
            AppAction::Submit("e2e4".to_string())
        );
        assert!(app.typed().is_empty());
        assert!(app.is_pending());
    }

    #[test]
    fn test_command_keys_need_empty_prompt() {
        let mut app = app();
        assert_eq!(app.handle_event(&key(KeyCode::Char('s'))), AppAction::SaveSnapshot);
        type_text(&mut app, "e7e8");
        assert_eq!(app.handle_event(&key(KeyCode::Char('q'))), AppAction::None);
        assert_eq!(app.typed(), "e7e8q");
        app.handle_event(&key(KeyCode::Esc));
        assert_eq!(app.handle_event(&key(KeyCode::Char('q'))), AppAction::Quit);
    }

    #[test]
    fn test_prompt_length_is_capped() {
        let mut app = app();
        type_text(&mut app, "e7e8qqq");
        assert_eq!(app.typed(), "e7e8q");
        app.handle_event(&key(KeyCode::Backspace));
        assert_eq!(app.typed(), "e7e8");
    }

    #[test]
    fn test_no_second_move_while_pending() {
        let mut app = app();
        type_text(&mut app, "e2e4");
        app.handle_event(&key(KeyCode::Enter));
        type_text(&mut app, "d2d4");
        assert_eq!(app.handle_event(&key(KeyCode::Enter)), AppAction::None);
        assert_eq!(app.message(), Some("Waiting for the engine"));
        assert_eq!(app.handle_event(&key(KeyCode::Char('r'))), AppAction::None);
    }

    #[test]
    fn test_click_select_then_click_target() {
        let mut app = app();
        let geometry = app.geometry();
        let (e2x, e2y) = geometry.origin_of(BoardSquare::parse("e2").unwrap());
        let (e4x, e4y) = geometry.origin_of(BoardSquare::parse("e4").unwrap());

        app.handle_event(&click(MouseEventKind::Down(MouseButton::Left), e2x, e2y));
        app.handle_event(&click(MouseEventKind::Up(MouseButton::Left), e2x, e2y));
        assert_eq!(app.selected(), BoardSquare::parse("e2"));
        assert_eq!(app.targets().len(), 2);

        assert_eq!(
            app.handle_event(&click(MouseEventKind::Down(MouseButton::Left), e4x, e4y)),
            AppAction::Submit("e2e4".to_string())
        );
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn test_drag_and_drop() {
        let mut app = app();
        let geometry = app.geometry();
        let (g1x, g1y) = geometry.origin_of(BoardSquare::parse("g1").unwrap());
        let (f3x, f3y) = geometry.origin_of(BoardSquare::parse("f3").unwrap());

        app.handle_event(&click(MouseEventKind::Down(MouseButton::Left), g1x, g1y));
        app.handle_event(&click(MouseEventKind::Drag(MouseButton::Left), f3x, f3y));
        assert!(app.dragging().is_some());
        assert_eq!(
            app.handle_event(&click(MouseEventKind::Up(MouseButton::Left), f3x, f3y)),
            AppAction::Submit("g1f3".to_string())
        );
    }

    #[test]
    fn test_apply_dispatch_report() {
        let session = session(&["e2e4", "e7e5", "g1f3", "b8c6"], FixedEngine::new());
        let mut app = App::new(session.snapshot(), BoardGeometry::default());
        type_text(&mut app, "e2e4");
        app.handle_event(&key(KeyCode::Enter));

        let report = session.submit_move("e2e4");
        assert!(report.requests(Notification::Reevaluate));
        app.apply(WorkerEvent::Dispatched {
            report,
            snapshot: session.snapshot(),
        });
        assert!(!app.is_pending());
        assert_eq!(app.message(), Some("You played e2e4. Black replied e7e5"));
        assert_eq!(app.snapshot().state.cursor, 2);
    }

    #[test]
    fn test_line_completion_is_announced() {
        let session = session(&["e2e4", "e7e5"], FixedEngine::new());
        let mut app = App::new(session.snapshot(), BoardGeometry::default());
        let report = session.submit_move("e2e4");
        app.apply(WorkerEvent::Dispatched {
            report,
            snapshot: session.snapshot(),
        });
        assert_eq!(
            app.message(),
            Some("You played e2e4. Black replied e7e5. Line complete, playing the engine")
        );
    }

    #[test]
    fn test_describe_wrong_opening_move() {
        let session = session(&["e2e4", "e7e5"], FixedEngine::new());
        let report = session.submit_move("d2d4");
        assert_eq!(
            describe(&report).as_deref(),
            Some("Incorrect move. Expected: e2e4, but got: d2d4")
        );
    }

    #[test]
    fn test_nothing_to_retry_clears_pending() {
        let mut app = app();
        assert_eq!(app.handle_event(&key(KeyCode::Char('r'))), AppAction::RetryEngine);
        assert!(app.is_pending());
        app.apply(WorkerEvent::NothingToRetry);
        assert!(!app.is_pending());
        assert_eq!(app.message(), Some("Nothing to retry"));
    }
}
