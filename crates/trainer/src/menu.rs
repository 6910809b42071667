//! Full-screen opening menu.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Rows between two menu entries.
pub const MENU_ROW_SPACING: u16 = 2;
/// Row of the first entry, below the title.
pub const MENU_TOP: u16 = 3;
const MENU_LEFT: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    None,
    Choose(usize),
    Quit,
}

/// Opening names with a highlighted entry.
#[derive(Debug, Clone)]
pub struct OpeningMenu {
    names: Vec<String>,
    selected: usize,
}

impl OpeningMenu {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self { names, selected: 0 }
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Entry drawn on a terminal row, if any.
    #[must_use]
    pub fn index_at(&self, row: u16) -> Option<usize> {
        let offset = row.checked_sub(MENU_TOP)?;
        if offset % MENU_ROW_SPACING != 0 {
            return None;
        }
        let index = usize::from(offset / MENU_ROW_SPACING);
        (index < self.names.len()).then_some(index)
    }

    pub fn handle_event(&mut self, event: &Event) -> MenuAction {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    return MenuAction::Quit;
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.selected = self.selected.saturating_sub(1);
                        MenuAction::None
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if self.selected + 1 < self.names.len() {
                            self.selected += 1;
                        }
                        MenuAction::None
                    }
                    KeyCode::Enter if !self.names.is_empty() => MenuAction::Choose(self.selected),
                    KeyCode::Esc | KeyCode::Char('q') => MenuAction::Quit,
                    _ => MenuAction::None,
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                match self.index_at(mouse.row) {
                    Some(index) => {
                        self.selected = index;
                        MenuAction::Choose(index)
                    }
                    None => MenuAction::None,
                }
            }
            _ => MenuAction::None,
        }
    }
}

pub fn draw_menu(frame: &mut Frame, menu: &OpeningMenu) {
    let area = frame.area();
    let title = Paragraph::new(Line::from(Span::styled(
        "Choose an opening",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let width = area.width.saturating_sub(MENU_LEFT);
    frame.render_widget(title, Rect::new(area.x + MENU_LEFT, area.y + 1, width, 1));

    for (index, name) in menu.names.iter().enumerate() {
        let Ok(index_u16) = u16::try_from(index) else {
            break;
        };
        let y = area.y + MENU_TOP + index_u16 * MENU_ROW_SPACING;
        if y >= area.bottom() {
            break;
        }
        let style = if index == menu.selected() {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default()
        };
        let entry = Paragraph::new(Line::from(Span::styled(format!(" {name} "), style)));
        frame.render_widget(entry, Rect::new(area.x + MENU_LEFT, y, width, 1));
    }

    let help_y = area.bottom().saturating_sub(1);
    let help = Paragraph::new("Up/Down to move, Enter or click to choose, q to quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, Rect::new(area.x, help_y, area.width, 1));
}
