//! Content cursor: which line of the scroll region streamed text has reached.

use crate::layout::LayoutProvider;
use crate::terminal::TerminalSink;
use std::io;
use std::sync::atomic::{AtomicU16, Ordering};

/// Line value meaning "nothing written to the content area yet".
const INITIAL_LINE: u16 = 0;

/// Tracks the current content line (1-based within the scroll region).
#[derive(Debug)]
pub struct ContentCursor {
    line: AtomicU16,
}

impl ContentCursor {
    /// A cursor with no content written yet.
    pub const fn new() -> Self {
        Self {
            line: AtomicU16::new(INITIAL_LINE),
        }
    }

    /// Current content line, or 0 before any content.
    pub fn line(&self) -> u16 {
        self.line.load(Ordering::Acquire)
    }

    /// Record `newlines` emitted lines, clamped to `content_height`.
    pub fn advance(&self, newlines: usize, content_height: u16) {
        let height = content_height.max(1);
        let step = u16::try_from(newlines).unwrap_or(u16::MAX);
        let _ = self
            .line
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |line| {
                Some(line.max(1).saturating_add(step).min(height))
            });
    }

    /// Clamp the tracked line after the scroll region shrank.
    pub fn clamp(&self, content_height: u16) {
        let height = content_height.max(1);
        let _ = self
            .line
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |line| Some(line.min(height)));
    }

    /// Forget all content; the next write starts at the top of the region.
    pub fn reset(&self) {
        self.line.store(INITIAL_LINE, Ordering::Release);
    }

    /// Move the terminal cursor to the top-left content cell and reset.
    ///
    /// Used after something else (an interactive subshell, say) had the
    /// whole terminal and the tracked position can no longer be trusted.
    pub fn reposition(
        &self,
        sink: &mut dyn TerminalSink,
        layout: &dyn LayoutProvider,
    ) -> io::Result<()> {
        let (top, _) = layout.scroll_region();
        sink.move_cursor(1, top)?;
        self.reset();
        Ok(())
    }

    /// Move the terminal cursor back to the tracked content line.
    pub fn restore(
        &self,
        sink: &mut dyn TerminalSink,
        layout: &dyn LayoutProvider,
    ) -> io::Result<()> {
        let (top, bottom) = layout.scroll_region();
        let height = bottom.saturating_sub(top) + 1;
        self.clamp(height);
        let line = self.line().max(1);
        sink.move_cursor(1, top + line - 1)
    }
}

impl Default for ContentCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ComponentSpec, ScreenLayout};
    use crate::terminal::MemorySink;

    #[test]
    fn test_advance_clamps() {
        let cursor = ContentCursor::new();
        assert_eq!(cursor.line(), 0);
        cursor.advance(3, 20);
        assert_eq!(cursor.line(), 4);
        cursor.advance(100, 20);
        assert_eq!(cursor.line(), 20);
        cursor.clamp(10);
        assert_eq!(cursor.line(), 10);
    }

    #[test]
    fn test_reposition_resets_to_top() {
        let layout = ScreenLayout::new(80, 24);
        layout.register_component(ComponentSpec::new("footer", 4, 100));
        let (mut sink, out) = MemorySink::memory(80, 24);
        let cursor = ContentCursor::new();
        cursor.advance(7, 20);

        cursor.reposition(&mut sink, &layout).unwrap();
        sink.flush().unwrap();
        assert_eq!(out.contents(), b"\x1b[1;1H");
        assert_eq!(cursor.line(), 0);
    }

    #[test]
    fn test_restore_moves_to_tracked_line() {
        let layout = ScreenLayout::new(80, 24);
        layout.register_component(ComponentSpec::new("footer", 4, 100));
        let (mut sink, out) = MemorySink::memory(80, 24);
        let cursor = ContentCursor::new();
        cursor.advance(4, 20);

        cursor.restore(&mut sink, &layout).unwrap();
        sink.flush().unwrap();
        assert_eq!(out.contents(), b"\x1b[5;1H");
    }
}
