use log::debug;
use ratatui::text::Line;
use std::collections::HashMap;
use std::sync::Arc;

use crate::git::{DiffSource, Result};
use crate::highlight::DiffDecorator;

/// A file's diff decorated for display.
///
/// Index `i` of `lines` is logical line `i` of the fetched diff text.
#[derive(Debug, Clone, Default)]
pub struct DecoratedDiff {
    pub lines: Vec<Line<'static>>,
}

impl DecoratedDiff {
    pub fn new(raw_diff: &str, decorator: &dyn DiffDecorator) -> Self {
        let mut lines = decorator.decorate_diff(raw_diff);
        // A decorator that drops or adds lines would break index mapping.
        lines.resize_with(raw_diff.lines().count(), Line::default);
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Memoizes fetched + decorated diffs per path for the whole session.
///
/// Failures are not cached, so a later `get` for the same path fetches again.
pub struct DiffCache {
    source: Box<dyn DiffSource>,
    decorator: Box<dyn DiffDecorator>,
    entries: HashMap<String, Arc<DecoratedDiff>>,
}

impl DiffCache {
    pub fn new(source: Box<dyn DiffSource>, decorator: Box<dyn DiffDecorator>) -> Self {
        Self {
            source,
            decorator,
            entries: HashMap::new(),
        }
    }

    /// Decorated diff for `path`, fetching and decorating it on first use.
    pub fn get(&mut self, path: &str) -> Result<Arc<DecoratedDiff>> {
        if let Some(entry) = self.entries.get(path) {
            debug!("diff cache hit: {}", path);
            return Ok(Arc::clone(entry));
        }

        debug!("diff cache miss: {}", path);
        let raw = self.source.get_diff(path)?;
        let decorated = Arc::new(DecoratedDiff::new(&raw, self.decorator.as_ref()));
        self.entries
            .insert(path.to_string(), Arc::clone(&decorated));
        Ok(decorated)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
