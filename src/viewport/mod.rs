use ratatui::text::Line;
use std::ops::Range;
use std::sync::Arc;

use crate::cache::DecoratedDiff;

/// Scroll window over the active file's decorated diff.
///
/// Knows nothing about cursors or comments; it only keeps `y_offset` inside
/// `[0, total_lines - height]`.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    width: u16,
    height: usize,
    y_offset: usize,
    content: Arc<DecoratedDiff>,
}

impl Viewport {
    pub fn new(width: u16, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    pub fn total_lines(&self) -> usize {
        self.content.len()
    }

    /// Replace the content and go back to the top.
    pub fn set_content(&mut self, content: Arc<DecoratedDiff>) {
        self.content = content;
        self.y_offset = 0;
    }

    pub fn clear(&mut self) {
        self.set_content(Arc::default());
    }

    pub fn set_size(&mut self, width: u16, height: usize) {
        self.width = width;
        self.height = height;
        self.scroll_to(self.y_offset);
    }

    fn max_offset(&self) -> usize {
        self.total_lines().saturating_sub(self.height)
    }

    pub fn scroll_to(&mut self, offset: usize) {
        self.y_offset = offset.min(self.max_offset());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_to(self.y_offset.saturating_add_signed(delta));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to(self.max_offset());
    }

    /// Scroll by the least amount that puts `line` inside the window.
    pub fn ensure_visible(&mut self, line: usize) {
        if self.height == 0 {
            return;
        }
        if line < self.y_offset {
            self.scroll_to(line);
        } else if line >= self.y_offset + self.height {
            self.scroll_to(line + 1 - self.height);
        }
    }

    /// Logical indices of the lines currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.y_offset.min(self.total_lines());
        let end = (self.y_offset + self.height).min(self.total_lines());
        start..end
    }

    pub fn visible_slice(&self) -> &[Line<'static>] {
        &self.content.lines[self.visible_range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::SyntaxDecorator;

    fn content(lines: usize) -> Arc<DecoratedDiff> {
        let text: String = (0..lines).map(|i| format!(" line {i}\n")).collect();
        Arc::new(DecoratedDiff::new(&text, &SyntaxDecorator::plain()))
    }

    fn viewport(lines: usize, height: usize) -> Viewport {
        let mut vp = Viewport::new(80, height);
        vp.set_content(content(lines));
        vp
    }

    #[test]
    fn scroll_past_end_clamps_to_last_page() {
        let mut vp = viewport(30, 10);
        vp.scroll_to(100);
        assert_eq!(vp.y_offset(), 20);
        assert_eq!(vp.y_offset() + vp.height(), vp.total_lines());
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut vp = viewport(5, 10);
        vp.scroll_to(3);
        assert_eq!(vp.y_offset(), 0);
        vp.scroll_by(4);
        assert_eq!(vp.y_offset(), 0);
    }

    #[test]
    fn scroll_by_negative_stops_at_zero() {
        let mut vp = viewport(30, 10);
        vp.scroll_to(5);
        vp.scroll_by(-8);
        assert_eq!(vp.y_offset(), 0);
    }

    #[test]
    fn visible_slice_is_truncated_at_end() {
        let mut vp = viewport(12, 10);
        vp.scroll_to(2);
        assert_eq!(vp.visible_range(), 2..12);
        assert_eq!(vp.visible_slice().len(), 10);

        let vp = viewport(4, 10);
        assert_eq!(vp.visible_slice().len(), 4);
    }

    #[test]
    fn resize_reclamps_offset() {
        let mut vp = viewport(30, 10);
        vp.scroll_to_bottom();
        assert_eq!(vp.y_offset(), 20);
        vp.set_size(80, 25);
        assert_eq!(vp.y_offset(), 5);
        vp.set_size(80, 40);
        assert_eq!(vp.y_offset(), 0);
    }

    #[test]
    fn ensure_visible_moves_minimum_amount() {
        let mut vp = viewport(30, 10);
        vp.ensure_visible(10);
        assert_eq!(vp.y_offset(), 1);
        vp.ensure_visible(5);
        assert_eq!(vp.y_offset(), 1);
        vp.ensure_visible(0);
        assert_eq!(vp.y_offset(), 0);
        vp.ensure_visible(25);
        assert_eq!(vp.y_offset(), 16);
    }

    #[test]
    fn new_content_resets_offset() {
        let mut vp = viewport(30, 10);
        vp.scroll_to(7);
        vp.set_content(content(30));
        assert_eq!(vp.y_offset(), 0);
    }

    #[test]
    fn zero_height_shows_nothing() {
        let vp = viewport(30, 0);
        assert!(vp.visible_slice().is_empty());
    }
}
