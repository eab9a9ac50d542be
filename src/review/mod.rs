//! Interactive review state machine.
//!
//! `ReviewState` owns the file list, the cursor/selection model, the comment
//! store and the scroll viewport. Every input is a [`ReviewEvent`] routed
//! through [`ReviewState::transition`], which dispatches on the active [`Mode`].

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::cache::DiffCache;
use crate::comments::{CommentKey, CommentLocation, CommentStore};
use crate::export::{self, ExportError, ReportSink};
use crate::viewport::Viewport;

pub const DEFAULT_COMMENT_CHAR_LIMIT: usize = 200;

/// A comment being typed, and where it will land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub key: CommentKey,
    pub input: String,
}

/// The four mutually exclusive interaction modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Visual selection from `anchor` to the cursor line.
    Selecting { anchor: usize },
    CommentEntry(CommentDraft),
    /// Picking a file; `cursor` indexes the file list.
    FileList { cursor: usize },
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Selecting { .. } => "VISUAL",
            Mode::CommentEntry(_) => "COMMENT",
            Mode::FileList { .. } => "FILES",
        }
    }
}

/// Inputs to the state machine, already decoupled from key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    MoveCursor(isize),
    CursorTop,
    CursorBottom,
    ScrollLines(isize),
    PageDown,
    PageUp,
    HalfPageDown,
    HalfPageUp,
    NextFile,
    PrevFile,
    Reload,
    ToggleSelection,
    BeginComment,
    InputChar(char),
    Backspace,
    ClearInput,
    CommitComment,
    CancelComment,
    EnterFileList,
    ExitFileList,
    FileListMove(isize),
    FileListSelect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Transient message shown in the status line until the next file switch
/// or until the UI expires it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub struct ReviewState {
    files: Vec<String>,
    current_index: Option<usize>,
    cache: DiffCache,
    viewport: Viewport,
    cursor_line: usize,
    mode: Mode,
    comments: CommentStore,
    status: Option<StatusMessage>,
    load_error: Option<String>,
    comment_char_limit: usize,
}

impl ReviewState {
    /// Start a session over `files`, opening the first one if there is any.
    pub fn new(files: Vec<String>, cache: DiffCache) -> Self {
        let mut state = Self {
            files,
            current_index: None,
            cache,
            viewport: Viewport::default(),
            cursor_line: 0,
            mode: Mode::Normal,
            comments: CommentStore::new(),
            status: None,
            load_error: None,
            comment_char_limit: DEFAULT_COMMENT_CHAR_LIMIT,
        };
        state.open_file(0);
        state
    }

    pub fn with_comment_char_limit(mut self, limit: usize) -> Self {
        self.comment_char_limit = limit;
        self
    }

    // ── Queries ──

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_index
            .and_then(|i| self.files.get(i))
            .map(String::as_str)
    }

    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn comments(&self) -> &CommentStore {
        &self.comments
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Why the active file could not be loaded, if it couldn't.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn total_lines(&self) -> usize {
        self.viewport.total_lines()
    }

    pub fn comment_char_limit(&self) -> usize {
        self.comment_char_limit
    }

    /// The selection as `(start, end)` with `start <= end`, while selecting.
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        match self.mode {
            Mode::Selecting { anchor } => {
                Some((anchor.min(self.cursor_line), anchor.max(self.cursor_line)))
            }
            _ => None,
        }
    }

    // ── Dispatch ──

    /// Apply one event. Events that mean nothing in the active mode are ignored.
    pub fn transition(&mut self, event: ReviewEvent) {
        debug!("{} <- {:?}", self.mode.label(), event);
        match self.mode {
            Mode::Normal => self.on_normal(event),
            Mode::Selecting { .. } => self.on_selecting(event),
            Mode::CommentEntry(_) => self.on_comment_entry(event),
            Mode::FileList { .. } => self.on_file_list(event),
        }
    }

    fn on_normal(&mut self, event: ReviewEvent) {
        match event {
            ReviewEvent::NextFile => self.next_file(),
            ReviewEvent::PrevFile => self.prev_file(),
            ReviewEvent::Reload => self.reload(),
            ReviewEvent::EnterFileList => self.enter_file_list(),
            ReviewEvent::ToggleSelection => self.toggle_selection(),
            ReviewEvent::BeginComment => self.begin_comment(),
            other => self.on_motion(other),
        }
    }

    fn on_selecting(&mut self, event: ReviewEvent) {
        match event {
            ReviewEvent::ToggleSelection => self.toggle_selection(),
            ReviewEvent::BeginComment => self.begin_comment(),
            other => self.on_motion(other),
        }
    }

    /// Cursor and scroll events shared by `Normal` and `Selecting`.
    fn on_motion(&mut self, event: ReviewEvent) {
        let height = self.viewport.height() as isize;
        match event {
            ReviewEvent::MoveCursor(delta) => self.move_cursor(delta),
            ReviewEvent::CursorTop => self.set_cursor(0),
            ReviewEvent::CursorBottom => self.set_cursor(self.total_lines().saturating_sub(1)),
            ReviewEvent::ScrollLines(lines) => self.scroll(lines),
            ReviewEvent::PageDown => self.scroll(height.max(1)),
            ReviewEvent::PageUp => self.scroll(-height.max(1)),
            ReviewEvent::HalfPageDown => self.scroll((height / 2).max(1)),
            ReviewEvent::HalfPageUp => self.scroll(-(height / 2).max(1)),
            _ => {}
        }
    }

    fn on_comment_entry(&mut self, event: ReviewEvent) {
        match event {
            ReviewEvent::InputChar(c) => self.push_char(c),
            ReviewEvent::Backspace => {
                if let Mode::CommentEntry(draft) = &mut self.mode {
                    draft.input.pop();
                }
            }
            ReviewEvent::ClearInput => {
                if let Mode::CommentEntry(draft) = &mut self.mode {
                    draft.input.clear();
                }
            }
            ReviewEvent::CommitComment => self.commit_comment(),
            ReviewEvent::CancelComment => self.cancel_comment(),
            _ => {}
        }
    }

    fn on_file_list(&mut self, event: ReviewEvent) {
        match event {
            ReviewEvent::FileListMove(delta) | ReviewEvent::MoveCursor(delta) => {
                self.file_list_move(delta)
            }
            ReviewEvent::FileListSelect => self.file_list_select(),
            ReviewEvent::ExitFileList => self.exit_file_list(),
            _ => {}
        }
    }

    // ── Files ──

    /// Make `index` the active file. Out-of-range indices are ignored.
    ///
    /// Resets the cursor, drops any selection and clears the status line. A
    /// failed fetch leaves the file active with an error shown in its place.
    pub fn open_file(&mut self, index: usize) {
        let Some(path) = self.files.get(index).cloned() else {
            return;
        };

        self.current_index = Some(index);
        self.cursor_line = 0;
        self.status = None;
        if matches!(self.mode, Mode::Selecting { .. }) {
            self.mode = Mode::Normal;
        }

        match self.cache.get(&path) {
            Ok(diff) => {
                self.viewport.set_content(diff);
                self.load_error = None;
            }
            Err(e) => {
                warn!("failed to load diff for {}: {}", path, e);
                self.viewport.clear();
                self.load_error = Some(format!("failed to load diff for {path}: {e}"));
            }
        }
    }

    pub fn next_file(&mut self) {
        if self.mode != Mode::Normal || self.files.is_empty() {
            return;
        }
        let len = self.files.len();
        let next = self.current_index.map_or(0, |i| (i + 1) % len);
        self.open_file(next);
    }

    pub fn prev_file(&mut self) {
        if self.mode != Mode::Normal || self.files.is_empty() {
            return;
        }
        let len = self.files.len();
        let prev = self.current_index.map_or(0, |i| (i + len - 1) % len);
        self.open_file(prev);
    }

    /// Open the active file again; the retry path after a failed fetch.
    pub fn reload(&mut self) {
        if let Some(index) = self.current_index {
            self.open_file(index);
        }
    }

    // ── Cursor ──

    fn is_navigable(&self) -> bool {
        matches!(self.mode, Mode::Normal | Mode::Selecting { .. })
    }

    /// Move the cursor by `delta` lines, clamped to the diff, scrolling the
    /// least amount needed to keep it visible.
    pub fn move_cursor(&mut self, delta: isize) {
        if !self.is_navigable() {
            return;
        }
        self.set_cursor(self.cursor_line.saturating_add_signed(delta));
    }

    fn set_cursor(&mut self, line: usize) {
        let total = self.total_lines();
        if total == 0 {
            self.cursor_line = 0;
            return;
        }
        self.cursor_line = line.min(total - 1);
        self.viewport.ensure_visible(self.cursor_line);
    }

    /// Scroll the viewport and pull the cursor back inside it.
    fn scroll(&mut self, lines: isize) {
        if self.total_lines() == 0 {
            return;
        }
        self.viewport.scroll_by(lines);
        let visible = self.viewport.visible_range();
        if !visible.is_empty() {
            self.cursor_line = self.cursor_line.clamp(visible.start, visible.end - 1);
        }
    }

    pub fn set_viewport_size(&mut self, width: u16, height: usize) {
        self.viewport.set_size(width, height);
    }

    // ── Selection ──

    /// Enter `Selecting` anchored at the cursor, or leave it discarding the range.
    pub fn toggle_selection(&mut self) {
        match self.mode {
            Mode::Normal if self.total_lines() > 0 => {
                self.mode = Mode::Selecting {
                    anchor: self.cursor_line,
                }
            }
            Mode::Selecting { .. } => self.mode = Mode::Normal,
            _ => {}
        }
    }

    // ── Comments ──

    /// Start typing a comment on the cursor line, or on the selection when
    /// selecting. A selection always produces a range key, even a one-line one.
    pub fn begin_comment(&mut self) {
        let location = match self.mode {
            Mode::Normal => CommentLocation::Line(self.cursor_line),
            Mode::Selecting { .. } => match self.selection_range() {
                Some((start, end)) => CommentLocation::Range { start, end },
                None => return,
            },
            _ => return,
        };

        let Some(path) = self.current_path().map(str::to_string) else {
            return;
        };
        if self.total_lines() == 0 {
            self.set_status(StatusKind::Error, "Nothing to comment on");
            return;
        }

        self.mode = Mode::CommentEntry(CommentDraft {
            key: CommentKey { path, location },
            input: String::new(),
        });
    }

    /// Append text to the comment being typed (no-op outside `CommentEntry`).
    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            self.push_char(c);
        }
    }

    fn push_char(&mut self, c: char) {
        let limit = self.comment_char_limit;
        if let Mode::CommentEntry(draft) = &mut self.mode
            && !c.is_control()
            && draft.input.chars().count() < limit
        {
            draft.input.push(c);
        }
    }

    /// Store the typed comment under its key and return to `Normal`.
    ///
    /// Blank text stores nothing.
    pub fn commit_comment(&mut self) {
        if !matches!(self.mode, Mode::CommentEntry(_)) {
            return;
        }
        if let Mode::CommentEntry(draft) = std::mem::take(&mut self.mode) {
            let text = draft.input.trim();
            if !text.is_empty() {
                info!("comment added at {}", draft.key);
                self.comments.add(draft.key, text);
            }
        }
    }

    pub fn cancel_comment(&mut self) {
        if matches!(self.mode, Mode::CommentEntry(_)) {
            self.mode = Mode::Normal;
        }
    }

    // ── File list ──

    pub fn enter_file_list(&mut self) {
        if self.mode == Mode::Normal && !self.files.is_empty() {
            self.mode = Mode::FileList {
                cursor: self.current_index.unwrap_or(0),
            };
        }
    }

    pub fn exit_file_list(&mut self) {
        if matches!(self.mode, Mode::FileList { .. }) {
            self.mode = Mode::Normal;
        }
    }

    pub fn file_list_move(&mut self, delta: isize) {
        let last = self.files.len().saturating_sub(1);
        if let Mode::FileList { cursor } = &mut self.mode {
            *cursor = cursor.saturating_add_signed(delta).min(last);
        }
    }

    pub fn file_list_select(&mut self) {
        if let Mode::FileList { cursor } = self.mode {
            self.mode = Mode::Normal;
            self.open_file(cursor);
        }
    }

    // ── Status / export ──

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Build the report and hand it to `sink`, reporting the outcome in the
    /// status line. The mode is left unchanged.
    pub fn deliver_report(&mut self, sink: &dyn ReportSink, now: DateTime<Local>) {
        self.status = None;
        let outcome = export::build_report(&self.comments, now)
            .and_then(|report| sink.deliver(&report, now));
        match outcome {
            Ok(message) => self.set_status(StatusKind::Info, message),
            Err(ExportError::NothingToExport) => {
                self.set_status(StatusKind::Error, "Error: no comments to export")
            }
            Err(e) => {
                warn!("export failed: {}", e);
                self.set_status(StatusKind::Error, format!("Error: {e}"));
            }
        }
    }
}
