use ratatui::style::{Color, Modifier, Style};

use crate::review::Mode;

pub const HEADER: Style = Style::new()
    .fg(Color::Indexed(15))
    .bg(Color::Indexed(4))
    .add_modifier(Modifier::BOLD);
pub const FOOTER: Style = Style::new().fg(Color::Indexed(8));

pub const CURSOR_LINE: Style = Style::new().bg(Color::Indexed(237));
pub const SELECTION: Style = Style::new()
    .fg(Color::Indexed(229))
    .bg(Color::Indexed(236));

pub const COMMENT: Style = Style::new()
    .fg(Color::Indexed(6))
    .add_modifier(Modifier::ITALIC);
pub const COMMENT_INPUT_BORDER: Style = Style::new().fg(Color::Indexed(6));
pub const PLACEHOLDER: Style = Style::new().fg(Color::Indexed(8));

pub const STATUS_INFO: Style = Style::new().fg(Color::Indexed(2));
pub const STATUS_ERROR: Style = Style::new()
    .fg(Color::Indexed(1))
    .add_modifier(Modifier::BOLD);
pub const NOTICE: Style = Style::new().fg(Color::Indexed(3));

pub const LIST_CURSOR: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
pub const LIST_ACTIVE: Style = Style::new().fg(Color::Cyan);

/// Badge shown next to the header for each mode.
pub fn mode_badge(mode: &Mode) -> Style {
    let bg = match mode {
        Mode::Normal => Color::Indexed(2),
        Mode::Selecting { .. } => Color::Indexed(5),
        Mode::CommentEntry(_) => Color::Indexed(6),
        Mode::FileList { .. } => Color::Indexed(3),
    };
    Style::new()
        .fg(Color::Indexed(0))
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}
