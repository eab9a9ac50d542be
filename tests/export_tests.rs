mod common;

use chrono::{Local, TimeZone};
use common::{MockSource, session};
use diff_review::comments::{CommentKey, CommentStore};
use diff_review::export::{self, ExportError, FileSink, NO_COMMENTS};
use diff_review::review::{ReviewEvent, StatusKind};

#[test]
fn report_round_trip() {
    let mut store = CommentStore::new();
    store.add(CommentKey::line("a.go", 5), "bounds check");
    store.add(CommentKey::range("a.go", 10, 15), "pull into helper");
    store.add(CommentKey::line("b.go", 20), "typo");

    let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let report = export::format_report(&store, now);

    assert!(report.starts_with("# Code Review Comments\n"));
    assert!(report.contains("# Generated: 2025-01-02 03:04:05"));
    assert!(report.contains("## File: a.go"));
    assert!(report.contains("## File: b.go"));
    assert!(report.contains("### Line 6\n- bounds check"));
    assert!(report.contains("### Lines 11-16\n- pull into helper"));
    assert!(report.contains("### Line 21\n- typo"));

    let a = report.find("## File: a.go").unwrap();
    let b = report.find("## File: b.go").unwrap();
    assert!(a < b);
}

#[test]
fn empty_store_exports_sentinel() {
    let store = CommentStore::new();
    assert_eq!(export::format_report(&store, Local::now()), NO_COMMENTS);
    assert!(matches!(
        export::build_report(&store, Local::now()),
        Err(ExportError::NothingToExport)
    ));
}

#[test]
fn saving_from_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::new().with_file("main.rs", 8);
    let mut state = session(&source);
    let sink = FileSink::new(dir.path());

    state.deliver_report(&sink, Local::now());
    assert_eq!(state.status().map(|s| s.kind), Some(StatusKind::Error));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    state.transition(ReviewEvent::MoveCursor(1));
    state.transition(ReviewEvent::ToggleSelection);
    state.transition(ReviewEvent::MoveCursor(1));
    state.transition(ReviewEvent::BeginComment);
    state.insert_text("split this");
    state.transition(ReviewEvent::CommitComment);

    let now = Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    state.deliver_report(&sink, now);
    let status = state.status().unwrap();
    assert_eq!(status.kind, StatusKind::Info);

    let path = dir.path().join("code-review-comments-20250601-120000.md");
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("## File: main.rs"));
    assert!(written.contains("### Lines 2-3\n- split this"));
}

#[test]
fn failed_save_keeps_mode_and_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource::new().with_file("main.rs", 8);
    let mut state = session(&source);
    state.transition(ReviewEvent::BeginComment);
    state.insert_text("x");
    state.transition(ReviewEvent::CommitComment);
    state.transition(ReviewEvent::ToggleSelection);

    let sink = FileSink::new(dir.path().join("missing"));
    state.deliver_report(&sink, Local::now());

    let status = state.status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.starts_with("Error: "));
    assert!(state.selection_range().is_some());
}
