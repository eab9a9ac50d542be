#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use diff_review::cache::DiffCache;
use diff_review::git::{DiffSource, GitError, Result};
use diff_review::highlight::SyntaxDecorator;
use diff_review::review::ReviewState;

/// In-memory `DiffSource` that records how often each path is fetched.
#[derive(Clone, Default)]
pub struct MockSource {
    diffs: Rc<RefCell<HashMap<String, String>>>,
    fetches: Rc<RefCell<HashMap<String, usize>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file whose diff is `lines` context lines.
    pub fn with_file(self, path: &str, lines: usize) -> Self {
        let diff: String = (0..lines).map(|i| format!(" {path} line {i}\n")).collect();
        self.with_diff(path, &diff)
    }

    pub fn with_diff(self, path: &str, diff: &str) -> Self {
        self.diffs
            .borrow_mut()
            .insert(path.to_string(), diff.to_string());
        self
    }

    pub fn remove(&self, path: &str) {
        self.diffs.borrow_mut().remove(path);
    }

    pub fn fetches(&self, path: &str) -> usize {
        self.fetches.borrow().get(path).copied().unwrap_or(0)
    }
}

impl DiffSource for MockSource {
    fn list_changed_files(&self) -> Result<Vec<String>> {
        let mut files: Vec<String> = self.diffs.borrow().keys().cloned().collect();
        files.sort();
        Ok(files)
    }

    fn get_diff(&self, path: &str) -> Result<String> {
        *self
            .fetches
            .borrow_mut()
            .entry(path.to_string())
            .or_default() += 1;
        self.diffs
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::CommandFailed(format!("unknown path {path}")))
    }
}

/// A session over `source` with a 10-line viewport.
pub fn session(source: &MockSource) -> ReviewState {
    let files = source.list_changed_files().unwrap();
    let cache = DiffCache::new(Box::new(source.clone()), Box::new(SyntaxDecorator::plain()));
    let mut state = ReviewState::new(files, cache);
    state.set_viewport_size(80, 10);
    state
}
