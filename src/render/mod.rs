//! Frame composition: turns a `ReviewState` into styled lines for one frame.
//!
//! Nothing here touches the terminal, so a frame can be inspected in tests.

pub mod styles;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use std::collections::HashSet;

use crate::comments::CommentKey;
use crate::review::{Mode, ReviewState, StatusKind};

pub const NO_CHANGES: &str = "No unstaged changes found.";
pub const COMMENT_PLACEHOLDER: &str = "Enter your comment...";

/// Comment box contents while in `CommentEntry`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentInput {
    pub title: String,
    pub text: Line<'static>,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFrame {
    pub header: Line<'static>,
    pub body: Vec<Line<'static>>,
    pub comment_input: Option<CommentInput>,
    pub status: Option<Line<'static>>,
    pub footer: Line<'static>,
}

pub fn compose(state: &ReviewState) -> ComposedFrame {
    let body = match state.mode() {
        Mode::FileList { cursor } => file_list_body(state, *cursor),
        _ => diff_body(state),
    };

    ComposedFrame {
        header: header(state),
        body,
        comment_input: comment_input(state),
        status: state.status().map(|status| {
            let style = match status.kind {
                StatusKind::Info => styles::STATUS_INFO,
                StatusKind::Error => styles::STATUS_ERROR,
            };
            Line::from(Span::styled(status.text.clone(), style))
        }),
        footer: Line::from(Span::styled(footer_hint(state.mode()), styles::FOOTER)),
    }
}

fn header(state: &ReviewState) -> Line<'static> {
    let title = match (state.current_index(), state.current_path()) {
        (Some(index), Some(path)) => {
            format!(" File {}/{}: {} ", index + 1, state.files().len(), path)
        }
        _ => " diff-review ".to_string(),
    };
    let mode = state.mode();
    Line::from(vec![
        Span::styled(format!(" {} ", mode.label()), styles::mode_badge(mode)),
        Span::styled(title, styles::HEADER),
    ])
}

fn footer_hint(mode: &Mode) -> &'static str {
    match mode {
        Mode::Normal => {
            "j/k: move | n/p: file | v: select | c: comment | Tab: files | s: save | y: copy | ?: help | q: quit"
        }
        Mode::Selecting { .. } => "j/k: extend | c: comment range | v/Esc: cancel | s: save | y: copy",
        Mode::CommentEntry(_) => "Enter: add comment | Esc: cancel | Ctrl+U: clear",
        Mode::FileList { .. } => "j/k: move | Enter: open | Esc/Tab: back | q: quit",
    }
}

/// The visible diff slice with cursor/selection styling and comments
/// interleaved after the lines they belong to.
///
/// The result never exceeds the viewport height. When comment rows would push
/// the cursor past the bottom edge, rows are dropped from the top instead.
fn diff_body(state: &ReviewState) -> Vec<Line<'static>> {
    let Some(path) = state.current_path() else {
        return vec![Line::from(Span::styled(NO_CHANGES, styles::NOTICE))];
    };
    if let Some(error) = state.load_error() {
        return vec![
            Line::from(Span::styled(format!("Error: {error}"), styles::STATUS_ERROR)),
            Line::default(),
            Line::from(Span::styled(
                "Press r to retry or n/p to switch files.",
                styles::NOTICE,
            )),
        ];
    }

    let viewport = state.viewport();
    let width = viewport.width();
    let selection = state.selection_range();
    let file_comments = state.comments().for_file(path);
    let mut emitted: HashSet<&CommentKey> = HashSet::new();
    let mut body = Vec::with_capacity(viewport.height());
    let mut cursor_row = None;

    for (offset, line) in viewport.visible_slice().iter().enumerate() {
        let index = viewport.y_offset() + offset;

        let highlight = match selection {
            Some((start, end)) if (start..=end).contains(&index) => Some(styles::SELECTION),
            _ if index == state.cursor_line() => Some(styles::CURSOR_LINE),
            _ => None,
        };
        if index == state.cursor_line() {
            cursor_row = Some(body.len());
        }
        body.push(match highlight {
            Some(style) => paint_line(line, style, width),
            None => line.clone(),
        });

        if let Some(comments) = file_comments.lines.get(&index) {
            body.extend(comments.iter().map(|c| comment_line(None, c)));
        }
        if let Some(threads) = file_comments.ranges.get(&index) {
            for (key, comments) in threads {
                if !emitted.insert(*key) {
                    continue;
                }
                let heading = key.location.heading();
                body.extend(comments.iter().map(|c| comment_line(Some(&heading), c)));
            }
        }
    }

    let height = viewport.height();
    if let Some(row) = cursor_row
        && row >= height
    {
        body.drain(..row + 1 - height);
    }
    body.truncate(height);
    body
}

fn comment_line(range: Option<&str>, text: &str) -> Line<'static> {
    let text = match range {
        Some(heading) => format!("  \u{25b8} [{heading}] {text}"),
        None => format!("  \u{25b8} {text}"),
    };
    Line::from(Span::styled(text, styles::COMMENT))
}

/// Restyle a whole line and pad it so the background spans the full width.
fn paint_line(line: &Line<'static>, style: Style, width: u16) -> Line<'static> {
    let mut painted = line.clone();
    for span in painted.spans.iter_mut() {
        span.style = span.style.patch(style);
    }
    let used = painted.width();
    let width = usize::from(width);
    if used < width {
        painted
            .spans
            .push(Span::styled(" ".repeat(width - used), style));
    }
    painted
}

fn file_list_body(state: &ReviewState, cursor: usize) -> Vec<Line<'static>> {
    state
        .files()
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let marker = if index == cursor { ">" } else { " " };
            let count = state.comments().count_for_file(path);
            let mut label = format!("{marker} {path}");
            if count > 0 {
                let noun = if count == 1 { "comment" } else { "comments" };
                label.push_str(&format!(" ({count} {noun})"));
            }

            let style = if index == cursor {
                styles::LIST_CURSOR
            } else if Some(index) == state.current_index() {
                styles::LIST_ACTIVE
            } else {
                Style::default()
            };
            Line::from(Span::styled(label, style))
        })
        .collect()
}

fn comment_input(state: &ReviewState) -> Option<CommentInput> {
    let Mode::CommentEntry(draft) = state.mode() else {
        return None;
    };
    let title = format!(
        " Comment on {} ({}/{}) ",
        draft.key.location.heading(),
        draft.input.chars().count(),
        state.comment_char_limit()
    );
    let text = if draft.input.is_empty() {
        Line::from(Span::styled(COMMENT_PLACEHOLDER, styles::PLACEHOLDER))
    } else {
        Line::from(draft.input.clone())
    };
    Some(CommentInput { title, text })
}
