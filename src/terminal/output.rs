//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.

use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// All output of a write batch is accumulated here, then flushed in a single
/// `write()` syscall so a batch never reaches the terminal in pieces.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Move cursor to (col, row), both 1-based.
    #[inline]
    pub fn cursor_move(&mut self, col: u16, row: u16) {
        // CSI row ; col H
        let _ = write!(self.data, "\x1b[{row};{col}H");
    }

    /// Clear the whole current line.
    #[inline]
    pub fn clear_line(&mut self) {
        self.data.extend_from_slice(b"\x1b[2K");
    }

    /// Clear from the cursor to the end of the line.
    #[inline]
    pub fn clear_to_eol(&mut self) {
        self.data.extend_from_slice(b"\x1b[K");
    }

    /// Save cursor position (DECSC).
    #[inline]
    pub fn save_cursor(&mut self) {
        self.data.extend_from_slice(b"\x1b7");
    }

    /// Restore cursor position (DECRC).
    #[inline]
    pub fn restore_cursor(&mut self) {
        self.data.extend_from_slice(b"\x1b8");
    }

    /// Set the scroll region to rows `top..=bottom` (1-based).
    #[inline]
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let _ = write!(self.data, "\x1b[{top};{bottom}r");
    }

    /// Reset the scroll region to the full screen.
    #[inline]
    pub fn reset_scroll_region(&mut self) {
        self.data.extend_from_slice(b"\x1b[r");
    }

    /// Flush to a writer in a single syscall and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        if self.data.is_empty() {
            return Ok(());
        }
        let result = writer.write_all(&self.data).and_then(|()| writer.flush());
        self.data.clear();
        result
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences() {
        let mut out = OutputBuffer::new();
        out.cursor_move(1, 20);
        out.clear_line();
        out.save_cursor();
        out.set_scroll_region(1, 19);
        out.restore_cursor();
        assert_eq!(out.as_bytes(), b"\x1b[20;1H\x1b[2K\x1b7\x1b[1;19r\x1b8");
    }

    #[test]
    fn test_flush_clears() {
        let mut out = OutputBuffer::new();
        out.write_raw(b"hello");
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"hello");
        assert!(out.is_empty());
    }
}
