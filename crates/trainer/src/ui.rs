//! Terminal renderer.
//!
//! Paints the board, evaluation bar and info lines from the [`App`]'s last
//! snapshot. The board's lines are cached and rebuilt only when something
//! they show changes; a dragged piece is drawn over the cached board.

use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use trainer_core::{BoardSquare, Mode, Snapshot};
use trainer_engine::EvaluationPair;

use crate::app::App;

/// Columns left of the board for the rank numbers.
pub const RANK_LABEL_WIDTH: u16 = 2;

const LIGHT_SQUARE: Color = Color::Rgb(240, 217, 181);
const DARK_SQUARE: Color = Color::Rgb(181, 136, 99);
const SELECTED_SQUARE: Color = Color::Rgb(246, 246, 105);
const TARGET_SQUARE: Color = Color::Rgb(130, 180, 90);
const LAST_MOVE_SQUARE: Color = Color::Rgb(205, 210, 106);
const WHITE_PIECE: Color = Color::Rgb(255, 255, 255);
const BLACK_PIECE: Color = Color::Rgb(0, 0, 0);

const HELP: &str =
    "Click or drag a piece, or type a move and press Enter | Esc clear | r retry | s snapshot | q quit";

/// Everything the cached board lines depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardKey {
    fen: String,
    selected: Option<BoardSquare>,
    targets: Vec<BoardSquare>,
    last_move: Option<(BoardSquare, BoardSquare)>,
    /// Origin of a piece being dragged, drawn empty.
    lifted: Option<BoardSquare>,
    square_width: u16,
    square_height: u16,
}

impl BoardKey {
    fn of(app: &App) -> Self {
        let geometry = app.geometry();
        Self {
            fen: app.snapshot().fen.clone(),
            selected: app.selected(),
            targets: app.targets().to_vec(),
            last_move: app.snapshot().last_move_squares(),
            lifted: app.dragging().map(|(square, _)| square),
            square_width: geometry.square_width,
            square_height: geometry.square_height,
        }
    }
}

/// The last rendered board.
#[derive(Debug, Default)]
pub struct BoardCache {
    key: Option<BoardKey>,
    lines: Vec<Line<'static>>,
    rebuilds: usize,
}

impl BoardCache {
    /// How often the board has been rebuilt.
    #[must_use]
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    fn lines(&mut self, app: &App) -> &[Line<'static>] {
        let key = BoardKey::of(app);
        if self.key.as_ref() != Some(&key) {
            self.lines = build_board(app.snapshot(), &key);
            self.key = Some(key);
            self.rebuilds += 1;
        }
        &self.lines
    }
}

/// Draws one frame. Also records where the board landed so pointer events
/// map onto the squares that are actually on screen.
pub fn draw(frame: &mut Frame, app: &mut App, cache: &mut BoardCache) {
    let geometry = app.geometry();
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(geometry.height().saturating_add(1)),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(frame.area());

    let board_area = chunks[2];
    app.place_board(board_area.x + RANK_LABEL_WIDTH, board_area.y);

    let snapshot = app.snapshot();
    frame.render_widget(Paragraph::new(info_line(snapshot)), chunks[0]);
    frame.render_widget(Paragraph::new(status_line(snapshot, app.is_pending())), chunks[1]);
    frame.render_widget(Paragraph::new(cache.lines(app).to_vec()), board_area);
    frame.render_widget(
        Paragraph::new(eval_bar(&snapshot.evaluation, geometry.width())),
        chunks[3],
    );
    frame.render_widget(
        Paragraph::new(app.message().unwrap_or_default().to_string())
            .style(Style::default().fg(Color::Yellow)),
        chunks[4],
    );
    frame.render_widget(Paragraph::new(format!("Move: {}_", app.typed())), chunks[5]);
    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[6],
    );

    draw_dragged_piece(frame, app);
}

fn info_line(snapshot: &Snapshot) -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "Opening: {} - {} (Moves Left: {})",
            snapshot.opening,
            snapshot.line_name,
            snapshot.remaining_moves()
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn status_line(snapshot: &Snapshot, pending: bool) -> Line<'static> {
    let mode = match snapshot.state.mode {
        Mode::Opening => "Opening line",
        Mode::FreePlay => "Free play",
    };
    let mut spans = vec![Span::raw(format!(
        "{} to move | {mode}",
        snapshot.state.side_to_move
    ))];

    let status = match snapshot.termination {
        Some(termination) => Some(termination.to_string()),
        None => snapshot.status.label().map(str::to_string),
    };
    if let Some(status) = status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            status,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if pending {
        spans.push(Span::styled(
            " | Engine thinking...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// White's share of the bar on the left, Black's on the right.
fn eval_bar(evaluation: &EvaluationPair, width: u16) -> Line<'static> {
    let width = usize::from(width);
    let filled = ((evaluation.white.bar_share() * width as f64).round() as usize).min(width);
    Line::from(vec![
        Span::raw(" ".repeat(usize::from(RANK_LABEL_WIDTH))),
        Span::styled(" ".repeat(filled), Style::default().bg(WHITE_PIECE)),
        Span::styled(" ".repeat(width - filled), Style::default().bg(Color::DarkGray)),
        Span::raw(format!(
            " White {} / Black {}",
            evaluation.white.label(),
            evaluation.black.label()
        )),
    ])
}

fn build_board(snapshot: &Snapshot, key: &BoardKey) -> Vec<Line<'static>> {
    let width = usize::from(key.square_width);
    let height = usize::from(key.square_height);
    let board = snapshot.board();
    let mut lines = Vec::with_capacity(height * 8 + 1);

    for (row, pieces) in board.iter().enumerate() {
        for sub_row in 0..height {
            let middle = sub_row == height / 2;
            let label = if middle {
                format!("{} ", 8 - row)
            } else {
                "  ".to_string()
            };
            let mut spans = vec![Span::raw(label)];

            for (col, piece) in pieces.iter().enumerate() {
                let Some(square) = BoardSquare::from_row_col(row, col) else {
                    continue;
                };
                let piece = if key.lifted == Some(square) { None } else { *piece };
                let text = match piece.and_then(glyph) {
                    Some(symbol) if middle => centered(symbol, width),
                    _ => " ".repeat(width),
                };
                let style = Style::default()
                    .bg(square_color(square, key))
                    .fg(piece_color(piece));
                spans.push(Span::styled(text, style));
            }
            lines.push(Line::from(spans));
        }
    }

    let mut files = " ".repeat(usize::from(RANK_LABEL_WIDTH));
    for file in 'a'..='h' {
        files.push_str(&centered(file, width));
    }
    lines.push(Line::from(files));
    lines
}

fn square_color(square: BoardSquare, key: &BoardKey) -> Color {
    if key.selected == Some(square) {
        SELECTED_SQUARE
    } else if key.targets.contains(&square) {
        TARGET_SQUARE
    } else if key
        .last_move
        .is_some_and(|(from, to)| from == square || to == square)
    {
        LAST_MOVE_SQUARE
    } else if square.is_dark() {
        DARK_SQUARE
    } else {
        LIGHT_SQUARE
    }
}

fn piece_color(piece: Option<char>) -> Color {
    match piece {
        Some(p) if p.is_ascii_uppercase() => WHITE_PIECE,
        _ => BLACK_PIECE,
    }
}

/// Solid chess glyph for a FEN piece letter; colour tells the sides apart.
fn glyph(piece: char) -> Option<char> {
    match piece.to_ascii_lowercase() {
        'k' => Some('\u{265A}'),
        'q' => Some('\u{265B}'),
        'r' => Some('\u{265C}'),
        'b' => Some('\u{265D}'),
        'n' => Some('\u{265E}'),
        'p' => Some('\u{265F}'),
        _ => None,
    }
}

fn centered(symbol: char, width: usize) -> String {
    let left = width.saturating_sub(1) / 2;
    let right = width.saturating_sub(1) - left;
    format!("{}{symbol}{}", " ".repeat(left), " ".repeat(right))
}

fn draw_dragged_piece(frame: &mut Frame, app: &App) {
    let Some((from, (column, row))) = app.dragging() else {
        return;
    };
    let Some(piece) = app.snapshot().piece_at(from) else {
        return;
    };
    let Some(symbol) = glyph(piece) else {
        return;
    };
    if let Some(cell) = frame.buffer_mut().cell_mut((column, row)) {
        cell.set_char(symbol)
            .set_fg(piece_color(Some(piece)))
            .set_bg(SELECTED_SQUARE);
    }
}
