//! Content log: plain-text record of every line the formatter emits.
//!
//! The log stores lines before styling, so hosts can search, copy or replay
//! the transcript without stripping escape sequences.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Destination for the plain text of every emitted line.
pub trait ContentLog: Send + Sync {
    /// Record one complete line, without its trailing newline.
    fn append_line(&self, line: &str);
}

/// Ring buffer of plain lines with a fixed capacity.
///
/// Appending past capacity discards the oldest line.
#[derive(Debug)]
pub struct ConsoleBuffer {
    lines: Mutex<VecDeque<String>>,
    max_lines: usize,
}

impl ConsoleBuffer {
    /// Create a buffer retaining at most `max_lines` lines.
    pub fn new(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            lines: Mutex::new(VecDeque::with_capacity(max_lines.min(1024))),
            max_lines,
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Maximum number of retained lines.
    pub const fn capacity(&self) -> usize {
        self.max_lines
    }

    /// The most recent line.
    pub fn last(&self) -> Option<String> {
        self.guard().back().cloned()
    }

    /// Copy of all retained lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.guard().iter().cloned().collect()
    }

    /// The last `viewport_height` lines, oldest first.
    pub fn visible_lines(&self, viewport_height: usize) -> Vec<String> {
        let lines = self.guard();
        let start = lines.len().saturating_sub(viewport_height);
        lines.range(start..).cloned().collect()
    }

    /// Discard all lines.
    pub fn clear(&self) {
        self.guard().clear();
    }
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl ContentLog for ConsoleBuffer {
    fn append_line(&self, line: &str) {
        let mut lines = self.guard();
        while lines.len() >= self.max_lines {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
    }
}
