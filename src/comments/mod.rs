use std::collections::HashMap;
use std::fmt;

/// Where a comment is anchored within a file's diff (0-indexed logical lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentLocation {
    Line(usize),
    /// Inclusive span, always stored with `start <= end`. A range that covers a
    /// single line is still a range, distinct from `Line` on that line.
    Range { start: usize, end: usize },
}

impl CommentLocation {
    pub fn range(a: usize, b: usize) -> Self {
        Self::Range {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Last line covered; range comments are shown after this line.
    pub fn end_line(&self) -> usize {
        match *self {
            Self::Line(line) => line,
            Self::Range { end, .. } => end,
        }
    }

    /// Report heading, 1-indexed.
    pub fn heading(&self) -> String {
        match *self {
            Self::Line(line) => format!("Line {}", line + 1),
            Self::Range { start, end } => format!("Lines {}-{}", start + 1, end + 1),
        }
    }
}

impl fmt::Display for CommentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "{line}"),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Identity of a comment thread: file plus location.
///
/// Displays as `path:N` or `path:S-E`; that string is the sort key for export.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentKey {
    pub path: String,
    pub location: CommentLocation,
}

impl CommentKey {
    pub fn line(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            location: CommentLocation::Line(line),
        }
    }

    pub fn range(path: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            path: path.into(),
            location: CommentLocation::range(start, end),
        }
    }
}

impl fmt::Display for CommentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.location)
    }
}

/// Append-only comment threads for the session.
#[derive(Debug, Clone, Default)]
pub struct CommentStore {
    threads: HashMap<CommentKey, Vec<String>>,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: CommentKey, text: impl Into<String>) {
        self.threads.entry(key).or_default().push(text.into());
    }

    pub fn get(&self, key: &CommentKey) -> &[String] {
        self.threads.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// Total comments across every thread.
    pub fn comment_count(&self) -> usize {
        self.threads.values().map(Vec::len).sum()
    }

    pub fn count_for_file(&self, path: &str) -> usize {
        self.threads
            .iter()
            .filter(|(key, _)| key.path == path)
            .map(|(_, comments)| comments.len())
            .sum()
    }

    /// Every thread ordered by the lexicographic order of its key string.
    pub fn sorted(&self) -> Vec<(&CommentKey, &[String])> {
        let mut entries: Vec<(String, &CommentKey, &[String])> = self
            .threads
            .iter()
            .map(|(key, comments)| (key.to_string(), key, comments.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .into_iter()
            .map(|(_, key, comments)| (key, comments))
            .collect()
    }

    /// Threads of one file, keyed by the line they are displayed after.
    ///
    /// Single-line threads and range threads are returned separately since
    /// they render under different rules.
    pub fn for_file(&self, path: &str) -> FileComments<'_> {
        let mut file = FileComments::default();
        for (key, comments) in self.threads.iter().filter(|(key, _)| key.path == path) {
            match key.location {
                CommentLocation::Line(line) => {
                    file.lines.insert(line, comments.as_slice());
                }
                CommentLocation::Range { end, .. } => {
                    file.ranges.entry(end).or_default().push((key, comments.as_slice()));
                }
            }
        }
        for threads in file.ranges.values_mut() {
            threads.sort_by_key(|(key, _)| key.to_string());
        }
        file
    }
}

/// Per-render index of one file's comments.
#[derive(Debug, Default)]
pub struct FileComments<'a> {
    pub lines: HashMap<usize, &'a [String]>,
    pub ranges: HashMap<usize, Vec<(&'a CommentKey, &'a [String])>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_and_degenerate_range_are_distinct() {
        assert_ne!(CommentKey::line("a.go", 5), CommentKey::range("a.go", 5, 5));
        assert_eq!(CommentKey::line("a.go", 5).to_string(), "a.go:5");
        assert_eq!(CommentKey::range("a.go", 5, 5).to_string(), "a.go:5-5");
    }

    #[test]
    fn range_is_normalized() {
        assert_eq!(CommentKey::range("f", 10, 5), CommentKey::range("f", 5, 10));
        assert_eq!(CommentKey::range("f", 10, 5).to_string(), "f:5-10");
    }

    #[test]
    fn comments_accumulate_in_insertion_order() {
        let mut store = CommentStore::new();
        let key = CommentKey::line("a.rs", 3);
        store.add(key.clone(), "first");
        store.add(key.clone(), "second");
        assert_eq!(store.get(&key), ["first", "second"]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.comment_count(), 2);
    }

    #[test]
    fn missing_key_has_no_comments() {
        let store = CommentStore::new();
        assert!(store.get(&CommentKey::line("x", 0)).is_empty());
    }

    #[test]
    fn sorted_uses_key_string_order() {
        let mut store = CommentStore::new();
        store.add(CommentKey::line("b.go", 20), "b");
        store.add(CommentKey::line("a.go", 5), "a5");
        store.add(CommentKey::range("a.go", 10, 15), "a10");
        let order: Vec<String> = store.sorted().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["a.go:10-15", "a.go:5", "b.go:20"]);
    }

    #[test]
    fn for_file_splits_lines_and_ranges() {
        let mut store = CommentStore::new();
        store.add(CommentKey::line("a.rs", 2), "line");
        store.add(CommentKey::range("a.rs", 0, 4), "range");
        store.add(CommentKey::range("a.rs", 3, 4), "inner");
        store.add(CommentKey::line("b.rs", 2), "other file");

        let file = store.for_file("a.rs");
        assert_eq!(file.lines.len(), 1);
        assert_eq!(file.lines[&2], ["line"]);
        let at_four: Vec<String> = file.ranges[&4].iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(at_four, vec!["a.rs:0-4", "a.rs:3-4"]);
        assert_eq!(store.count_for_file("a.rs"), 3);
    }

    #[test]
    fn headings_are_one_indexed() {
        assert_eq!(CommentLocation::Line(5).heading(), "Line 6");
        assert_eq!(CommentLocation::range(10, 15).heading(), "Lines 11-16");
    }
}
