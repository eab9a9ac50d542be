use log::debug;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::path::Path;
use syntect::{
    easy::HighlightLines,
    highlighting::{Color as SyntectColor, Theme, ThemeSet},
    parsing::SyntaxSet,
};

/// Maximum line length for syntax highlighting (skip longer lines for performance).
const MAX_LINE_LENGTH: usize = 10_000;

const TAB_WIDTH: usize = 4;

pub const ADDED: Color = Color::Indexed(35);
pub const DELETED: Color = Color::Indexed(167);
pub const HUNK: Color = Color::Indexed(39);
pub const HEADER: Color = Color::Indexed(63);
pub const META: Color = Color::Indexed(244);

/// Turns unified diff text into styled terminal lines.
///
/// Implementations must never fail: anything they cannot style is returned
/// with plain diff coloring.
pub trait DiffDecorator {
    /// Decorate one diff line that belongs to `filename`.
    fn decorate(&self, filename: &str, line: &str) -> Line<'static>;

    /// Decorate a whole diff, producing exactly one line per input line.
    ///
    /// The current file is tracked from the `diff --git` and `+++` headers.
    fn decorate_diff(&self, diff: &str) -> Vec<Line<'static>> {
        let mut tracker = DiffWalker::default();
        diff.lines()
            .map(|raw| match tracker.classify(raw) {
                LineClass::Content => self.decorate(&tracker.current_file, raw),
                other => chrome_line(other, raw),
            })
            .collect()
    }
}

/// Syntax highlighter for diff content.
///
/// This struct is immutable and can be shared. Use `for_file()` to create
/// a stateful highlighter session for a specific file.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a new Highlighter with default syntax and theme sets.
    ///
    /// This loads all bundled syntaxes and themes, which takes ~250ms.
    /// The cost is paid once at initialization.
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get("base16-ocean.dark")
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self { syntax_set, theme }
    }

    /// Create a file-scoped highlighter session that maintains state across lines.
    ///
    /// `file_key` is an extension (`rs`) or a syntax name (`Makefile`).
    pub fn for_file(&self, file_key: &str) -> FileHighlighter<'_> {
        FileHighlighter::new(&self.syntax_set, &self.theme, file_key)
    }

    fn syntect_to_ratatui(color: SyntectColor) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintains HighlightLines state across lines within a single file.
///
/// It must be used sequentially for all lines in a file.
pub struct FileHighlighter<'a> {
    highlighter: Option<HighlightLines<'a>>,
    syntax_set: &'a SyntaxSet,
}

impl<'a> FileHighlighter<'a> {
    fn new(syntax_set: &'a SyntaxSet, theme: &'a Theme, file_key: &str) -> Self {
        let syntax = syntax_set
            .find_syntax_by_extension(file_key)
            .or_else(|| syntax_set.find_syntax_by_name(file_key));

        let highlighter = syntax.map(|s| HighlightLines::new(s, theme));

        Self {
            highlighter,
            syntax_set,
        }
    }

    /// Highlight a single diff line. Maintains state for multi-line constructs.
    ///
    /// Falls back to plain diff coloring if highlighting fails or file type is unknown.
    pub fn highlight_diff_line(&mut self, line: &str) -> Vec<Span<'static>> {
        let Some((prefix, prefix_color)) = diff_prefix(line) else {
            return plain_diff_line(line);
        };

        if line.len() > MAX_LINE_LENGTH {
            return plain_diff_line(line);
        }

        let Some(ref mut highlighter) = self.highlighter else {
            return plain_diff_line(line);
        };

        let content = &line[prefix.len()..];
        match highlighter.highlight_line(content, self.syntax_set) {
            Ok(regions) => {
                let mut spans = Vec::with_capacity(regions.len() + 1);
                spans.push(Span::styled(
                    prefix.to_string(),
                    Style::default().fg(prefix_color),
                ));
                for (style, text) in regions {
                    spans.push(Span::styled(
                        text.to_string(),
                        Style::default().fg(Highlighter::syntect_to_ratatui(style.foreground)),
                    ));
                }
                spans
            }
            Err(e) => {
                debug!("syntax highlighting failed, using plain line: {}", e);
                plain_diff_line(line)
            }
        }
    }
}

/// Default decorator: syntect highlighting on top of diff coloring.
///
/// Built once at startup and handed to the diff cache.
pub struct SyntaxDecorator {
    highlighter: Option<Highlighter>,
}

impl SyntaxDecorator {
    pub fn new() -> Self {
        Self {
            highlighter: Some(Highlighter::new()),
        }
    }

    /// Diff coloring only, no syntax sets loaded.
    pub fn plain() -> Self {
        Self { highlighter: None }
    }
}

impl Default for SyntaxDecorator {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffDecorator for SyntaxDecorator {
    /// Each call starts a fresh syntect session, so a line inside a block
    /// comment or multi-line string is highlighted as if it stood alone.
    /// Whole diffs go through `decorate_diff`, which keeps one session per
    /// file.
    fn decorate(&self, filename: &str, line: &str) -> Line<'static> {
        let line = normalize_content(line);
        match &self.highlighter {
            Some(h) => Line::from(h.for_file(&file_key(filename)).highlight_diff_line(&line)),
            None => Line::from(plain_diff_line(&line)),
        }
    }

    fn decorate_diff(&self, diff: &str) -> Vec<Line<'static>> {
        let Some(highlighter) = &self.highlighter else {
            let mut walker = DiffWalker::default();
            return diff
                .lines()
                .map(|raw| match walker.classify(raw) {
                    LineClass::Content => Line::from(plain_diff_line(&normalize_content(raw))),
                    other => chrome_line(other, raw),
                })
                .collect();
        };

        let mut walker = DiffWalker::default();
        let mut session_file = String::new();
        let mut session = highlighter.for_file("");
        diff.lines()
            .map(|raw| match walker.classify(raw) {
                LineClass::Content => {
                    if session_file != walker.current_file {
                        session_file = walker.current_file.clone();
                        session = highlighter.for_file(&file_key(&session_file));
                    }
                    Line::from(session.highlight_diff_line(&normalize_content(raw)))
                }
                other => chrome_line(other, raw),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineClass {
    FileHeader,
    Meta,
    HunkHeader,
    Content,
}

/// Tracks which file a diff line belongs to and whether it sits inside a hunk.
#[derive(Debug, Default)]
struct DiffWalker {
    current_file: String,
    in_hunk: bool,
}

impl DiffWalker {
    fn classify(&mut self, line: &str) -> LineClass {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            self.in_hunk = false;
            if let Some((_, new_path)) = rest.rsplit_once(" b/") {
                self.current_file = new_path.to_string();
            }
            return LineClass::FileHeader;
        }
        if line.starts_with("@@") {
            self.in_hunk = true;
            return LineClass::HunkHeader;
        }
        if self.in_hunk {
            return LineClass::Content;
        }
        if let Some(path) = line.strip_prefix("+++ ") {
            if path != "/dev/null" {
                self.current_file = path.strip_prefix("b/").unwrap_or(path).to_string();
            }
            return LineClass::FileHeader;
        }
        if line.starts_with("--- ") {
            return LineClass::FileHeader;
        }
        LineClass::Meta
    }
}

fn chrome_line(class: LineClass, raw: &str) -> Line<'static> {
    let color = match class {
        LineClass::FileHeader => HEADER,
        LineClass::HunkHeader => HUNK,
        LineClass::Meta | LineClass::Content => META,
    };
    Line::from(Span::styled(
        normalize_content(raw),
        Style::default().fg(color),
    ))
}

fn diff_prefix(line: &str) -> Option<(&'static str, Color)> {
    if line.starts_with('+') {
        Some(("+", ADDED))
    } else if line.starts_with('-') {
        Some(("-", DELETED))
    } else if line.starts_with(' ') {
        Some((" ", Color::Reset))
    } else {
        None
    }
}

/// Whole line in its diff color, no syntax tokens.
fn plain_diff_line(line: &str) -> Vec<Span<'static>> {
    match diff_prefix(line) {
        Some((_, Color::Reset)) | None => vec![Span::raw(line.to_string())],
        Some((_, color)) => vec![Span::styled(line.to_string(), Style::default().fg(color))],
    }
}

fn normalize_content(value: &str) -> String {
    value.replace('\t', &" ".repeat(TAB_WIDTH)).replace('\r', "")
}

/// Extension if there is one, else the bare file name (`Makefile`, `Dockerfile`).
fn file_key(filename: &str) -> String {
    let path = Path::new(filename);
    path.extension()
        .or_else(|| path.file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}
