use chrono::{DateTime, Local};
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::comments::CommentStore;

/// Returned by `format_report` when there is nothing to export.
pub const NO_COMMENTS: &str = "No comments to export.";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no comments to export")]
    NothingToExport,
    #[error("failed to save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to copy to clipboard: {0}")]
    Clipboard(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Render every comment thread as a markdown report.
///
/// Files and locations follow the lexicographic order of the comment keys.
/// An empty store yields exactly [`NO_COMMENTS`].
pub fn format_report(store: &CommentStore, generated_at: DateTime<Local>) -> String {
    if store.is_empty() {
        return NO_COMMENTS.to_string();
    }

    let mut out = String::new();
    out.push_str("# Code Review Comments\n");
    let _ = writeln!(
        out,
        "# Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    let mut current_file: Option<&str> = None;
    for (key, comments) in store.sorted() {
        if current_file != Some(key.path.as_str()) {
            if current_file.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "## File: {}\n", key.path);
            current_file = Some(key.path.as_str());
        }

        let _ = writeln!(out, "### {}", key.location.heading());
        for comment in comments {
            let _ = writeln!(out, "- {comment}");
        }
        out.push('\n');
    }

    out
}

/// The report for `store`, or `NothingToExport` when it is empty.
pub fn build_report(store: &CommentStore, generated_at: DateTime<Local>) -> Result<String> {
    let report = format_report(store, generated_at);
    if report == NO_COMMENTS {
        return Err(ExportError::NothingToExport);
    }
    Ok(report)
}

/// Somewhere a finished report can be delivered.
pub trait ReportSink {
    /// Deliver `report`, returning a short confirmation for the status line.
    fn deliver(&self, report: &str, now: DateTime<Local>) -> Result<String>;
}

/// Writes `code-review-comments-<timestamp>.md` into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, now: DateTime<Local>) -> PathBuf {
        self.directory.join(format!(
            "code-review-comments-{}.md",
            now.format("%Y%m%d-%H%M%S")
        ))
    }
}

impl ReportSink for FileSink {
    fn deliver(&self, report: &str, now: DateTime<Local>) -> Result<String> {
        let path = self.path_for(now);
        fs::write(&path, report)?;
        info!("saved review report to {}", path.display());
        Ok(format!("Saved to {}", path.display()))
    }
}

/// Puts the report on the system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardSink;

impl ReportSink for ClipboardSink {
    fn deliver(&self, report: &str, _now: DateTime<Local>) -> Result<String> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(report.to_string())
            .map_err(|e| ExportError::Clipboard(e.to_string()))?;
        info!("copied review report to clipboard ({} bytes)", report.len());
        Ok("Copied to clipboard".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::CommentKey;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn empty_store_yields_sentinel() {
        let store = CommentStore::new();
        assert_eq!(format_report(&store, fixed_time()), NO_COMMENTS);
        assert!(matches!(
            build_report(&store, fixed_time()),
            Err(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn report_layout_matches_expected_text() {
        let mut store = CommentStore::new();
        store.add(CommentKey::line("a.go", 5), "check bounds");
        store.add(CommentKey::line("a.go", 5), "and nil");
        store.add(CommentKey::range("a.go", 10, 15), "extract helper");
        store.add(CommentKey::line("b.go", 20), "typo");

        let expected = "# Code Review Comments
# Generated: 2024-03-09 14:05:07

## File: a.go

### Lines 11-16
- extract helper

### Line 6
- check bounds
- and nil


## File: b.go

### Line 21
- typo

";
        assert_eq!(format_report(&store, fixed_time()), expected);
    }

    #[test]
    fn degenerate_range_is_reported_as_range() {
        let mut store = CommentStore::new();
        store.add(CommentKey::range("x.rs", 3, 3), "one-line range");
        store.add(CommentKey::line("x.rs", 3), "plain");
        let report = format_report(&store, fixed_time());
        assert!(report.contains("### Lines 4-4\n- one-line range"));
        assert!(report.contains("### Line 4\n- plain"));
    }

    #[test]
    fn file_sink_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let message = sink.deliver("report body", fixed_time()).unwrap();

        let path = dir.path().join("code-review-comments-20240309-140507.md");
        assert_eq!(fs::read_to_string(&path).unwrap(), "report body");
        assert!(message.starts_with("Saved to "));
    }

    #[test]
    fn file_sink_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("does/not/exist"));
        assert!(matches!(
            sink.deliver("x", fixed_time()),
            Err(ExportError::Io(_))
        ));
    }
}
