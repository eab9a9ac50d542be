use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

use crate::export::{ClipboardSink, FileSink};
use crate::render::{self, styles};
use crate::review::{Mode, ReviewEvent, ReviewState, StatusMessage};

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: isize = 3;

/// What a key press asks for. Everything except `Review` is handled by the
/// UI shell rather than the review state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Save,
    Copy,
    Review(ReviewEvent),
}

/// Translate a key press into an action for the current mode.
pub fn map_key(mode: &Mode, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    // The comment box swallows all text, including the global shortcut keys.
    if let Mode::CommentEntry(_) = mode {
        let event = match key.code {
            KeyCode::Enter => ReviewEvent::CommitComment,
            KeyCode::Esc => ReviewEvent::CancelComment,
            KeyCode::Backspace => ReviewEvent::Backspace,
            KeyCode::Char('u') if ctrl => ReviewEvent::ClearInput,
            KeyCode::Char(c) if !ctrl => ReviewEvent::InputChar(c),
            _ => return None,
        };
        return Some(Action::Review(event));
    }

    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('?') => return Some(Action::Help),
        KeyCode::Char('s') => return Some(Action::Save),
        KeyCode::Char('y') => return Some(Action::Copy),
        _ => {}
    }

    let event = match mode {
        Mode::FileList { .. } => match key.code {
            KeyCode::Char('j') | KeyCode::Down => ReviewEvent::FileListMove(1),
            KeyCode::Char('k') | KeyCode::Up => ReviewEvent::FileListMove(-1),
            KeyCode::Enter => ReviewEvent::FileListSelect,
            KeyCode::Esc | KeyCode::Tab => ReviewEvent::ExitFileList,
            _ => return None,
        },
        Mode::Normal | Mode::Selecting { .. } => match key.code {
            KeyCode::Char('j') | KeyCode::Down => ReviewEvent::MoveCursor(1),
            KeyCode::Char('k') | KeyCode::Up => ReviewEvent::MoveCursor(-1),
            KeyCode::Char('d') if ctrl => ReviewEvent::HalfPageDown,
            KeyCode::Char('u') if ctrl => ReviewEvent::HalfPageUp,
            KeyCode::PageDown => ReviewEvent::PageDown,
            KeyCode::PageUp => ReviewEvent::PageUp,
            KeyCode::Char('g') | KeyCode::Home => ReviewEvent::CursorTop,
            KeyCode::Char('G') | KeyCode::End => ReviewEvent::CursorBottom,
            KeyCode::Char('v') => ReviewEvent::ToggleSelection,
            KeyCode::Esc if matches!(mode, Mode::Selecting { .. }) => {
                ReviewEvent::ToggleSelection
            }
            KeyCode::Char('c') => ReviewEvent::BeginComment,
            KeyCode::Char('n') => ReviewEvent::NextFile,
            KeyCode::Char('p') => ReviewEvent::PrevFile,
            KeyCode::Char('r') => ReviewEvent::Reload,
            KeyCode::Tab => ReviewEvent::EnterFileList,
            _ => return None,
        },
        Mode::CommentEntry(_) => return None,
    };
    Some(Action::Review(event))
}

/// Application state for the TUI.
pub struct App {
    state: ReviewState,
    file_sink: FileSink,
    show_help: bool,
    should_quit: bool,
    status_timeout: Duration,
    status_since: Option<(StatusMessage, Instant)>,
}

impl App {
    pub fn new(state: ReviewState, file_sink: FileSink, status_timeout: Duration) -> Self {
        Self {
            state,
            file_sink,
            show_help: false,
            should_quit: false,
            status_timeout,
            status_since: None,
        }
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Handle keyboard input; the help overlay eats the first key after it opens.
    pub fn handle_input(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match map_key(self.state.mode(), key) {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::Help) => self.show_help = true,
            Some(Action::Save) => self.state.deliver_report(&self.file_sink, Local::now()),
            Some(Action::Copy) => self.state.deliver_report(&ClipboardSink, Local::now()),
            Some(Action::Review(event)) => self.state.transition(event),
            None => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.show_help {
            return;
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.state.transition(ReviewEvent::ScrollLines(WHEEL_LINES))
            }
            MouseEventKind::ScrollUp => {
                self.state.transition(ReviewEvent::ScrollLines(-WHEEL_LINES))
            }
            _ => {}
        }
    }

    /// Drop the status message once it has been visible for the timeout.
    pub fn expire_status(&mut self, now: Instant) {
        let Some(current) = self.state.status() else {
            self.status_since = None;
            return;
        };
        match &self.status_since {
            Some((seen, since)) if seen == current => {
                if now.duration_since(*since) >= self.status_timeout {
                    self.state.clear_status();
                    self.status_since = None;
                }
            }
            _ => self.status_since = Some((current.clone(), now)),
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        self.expire_status(Instant::now());

        let in_comment = matches!(self.state.mode(), Mode::CommentEntry(_));
        let has_status = self.state.status().is_some();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(if in_comment { 3 } else { 0 }),
                Constraint::Length(u16::from(has_status)),
                Constraint::Length(1),
            ])
            .split(frame.area());

        // Geometry must be current before the frame is composed.
        let body_area = chunks[1];
        self.state
            .set_viewport_size(body_area.width, usize::from(body_area.height));
        let composed = render::compose(&self.state);

        frame.render_widget(
            Paragraph::new(composed.header).style(styles::HEADER),
            chunks[0],
        );
        frame.render_widget(Paragraph::new(Text::from(composed.body)), body_area);

        if let Some(input) = composed.comment_input {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(styles::COMMENT_INPUT_BORDER)
                .title(input.title);
            frame.render_widget(Paragraph::new(input.text).block(block), chunks[2]);
        }
        if let Some(status) = composed.status {
            frame.render_widget(Paragraph::new(status), chunks[3]);
        }
        frame.render_widget(Paragraph::new(composed.footer), chunks[4]);

        if self.show_help {
            render_help(frame);
        }
    }
}

const HELP_TEXT: &[&str] = &[
    "diff-review - Keyboard Shortcuts",
    "",
    "Navigation:",
    "  j / Down        - Next line",
    "  k / Up          - Previous line",
    "  Ctrl+d / Ctrl+u - Half page down / up",
    "  PgDn / PgUp     - Page down / up",
    "  g / G           - First / last line",
    "  n / p           - Next / previous file",
    "  Tab             - File list",
    "  r               - Reload current file",
    "",
    "Comments:",
    "  v               - Start / cancel selection",
    "  c               - Comment on line or selection",
    "  Enter / Esc     - Add / discard comment",
    "",
    "Export:",
    "  s               - Save comments to file",
    "  y               - Copy comments to clipboard",
    "",
    "Other:",
    "  ?               - Show this help",
    "  q / Ctrl+c      - Quit",
    "",
    "Press any key to close this help",
];

/// Render the help overlay.
fn render_help(frame: &mut Frame) {
    let text = Text::from(HELP_TEXT.iter().map(|&s| Line::from(s)).collect::<Vec<_>>());
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });

    let area = centered_rect(60, 80, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Setup the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Launch the interactive review interface.
pub fn run_tui(mut app: App) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;

    let result = (|| -> Result<()> {
        loop {
            terminal
                .draw(|f| app.render(f))
                .context("Failed to draw frame")?;

            if app.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(200)).context("Failed to poll events")? {
                match event::read().context("Failed to read event")? {
                    // Ignore key release events
                    Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                        app.handle_input(key)
                    }
                    Event::Mouse(mouse) => app.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    })();

    restore_terminal(&mut terminal)?;
    info!(
        "session ended with {} comments",
        app.state.comments().comment_count()
    );

    result
}
