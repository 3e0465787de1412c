//! Terminal sinks: primitive cursor/write operations against a terminal.

use super::output::OutputBuffer;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Primitive operations against the real terminal.
///
/// Coordinates are 1-based. Writes may be buffered until [`flush`]; callers
/// flush once per logical batch while holding the output lock.
///
/// [`flush`]: TerminalSink::flush
pub trait TerminalSink: Send {
    /// Move the cursor to (col, row).
    fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()>;
    /// Clear the current line.
    fn clear_line(&mut self) -> io::Result<()>;
    /// Clear from the cursor to the end of the line.
    fn clear_to_end_of_line(&mut self) -> io::Result<()>;
    /// Write raw bytes.
    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// Save the cursor position.
    fn save_cursor(&mut self) -> io::Result<()>;
    /// Restore the saved cursor position.
    fn restore_cursor(&mut self) -> io::Result<()>;
    /// Confine scrolling to rows `top..=bottom`.
    fn set_scroll_region(&mut self, top: u16, bottom: u16) -> io::Result<()>;
    /// Let the whole screen scroll again.
    fn reset_scroll_region(&mut self) -> io::Result<()>;
    /// Terminal size as `(width, height)`.
    fn size(&self) -> io::Result<(u16, u16)>;
    /// Push buffered output to the terminal.
    fn flush(&mut self) -> io::Result<()>;
}

/// A sink that encodes operations as ANSI sequences into an [`OutputBuffer`]
/// and hands them to `W` in one write per flush.
#[derive(Debug)]
pub struct AnsiSink<W: Write + Send> {
    writer: W,
    output: OutputBuffer,
    fixed_size: Option<(u16, u16)>,
}

impl<W: Write + Send> AnsiSink<W> {
    /// Wrap a writer. The size is queried from the controlling terminal.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            output: OutputBuffer::new(),
            fixed_size: None,
        }
    }

    /// Wrap a writer that reports a fixed size.
    pub fn with_size(writer: W, width: u16, height: u16) -> Self {
        Self {
            writer,
            output: OutputBuffer::new(),
            fixed_size: Some((width, height)),
        }
    }

    /// Change the reported size of a fixed-size sink.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.fixed_size = Some((width, height));
    }

    /// Bytes buffered but not yet flushed.
    pub fn pending(&self) -> &[u8] {
        self.output.as_bytes()
    }
}

impl<W: Write + Send> TerminalSink for AnsiSink<W> {
    fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        self.output.cursor_move(col, row);
        Ok(())
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.output.clear_line();
        Ok(())
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        self.output.clear_to_eol();
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_raw(bytes);
        Ok(())
    }

    fn save_cursor(&mut self) -> io::Result<()> {
        self.output.save_cursor();
        Ok(())
    }

    fn restore_cursor(&mut self) -> io::Result<()> {
        self.output.restore_cursor();
        Ok(())
    }

    fn set_scroll_region(&mut self, top: u16, bottom: u16) -> io::Result<()> {
        self.output.set_scroll_region(top, bottom);
        Ok(())
    }

    fn reset_scroll_region(&mut self) -> io::Result<()> {
        self.output.reset_scroll_region();
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        match self.fixed_size {
            Some(size) => Ok(size),
            None => crossterm::terminal::size(),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush_to(&mut self.writer)
    }
}

/// Sink for the process's standard output.
pub type StdoutSink = AnsiSink<Stdout>;

impl StdoutSink {
    /// Sink writing to stdout, sized from the controlling terminal.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

/// A cloneable in-memory byte buffer usable as a writer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fixed-size sink capturing output in memory.
pub type MemorySink = AnsiSink<SharedBuffer>;

impl MemorySink {
    /// Create a memory sink and return it with a handle to its output.
    pub fn memory(width: u16, height: u16) -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (Self::with_size(buffer.clone(), width, height), buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_buffers_until_flush() {
        let (mut sink, out) = MemorySink::memory(80, 24);
        sink.move_cursor(1, 1).unwrap();
        sink.write_raw(b"hi").unwrap();
        assert!(out.contents().is_empty());
        assert_eq!(sink.pending(), b"\x1b[1;1Hhi");

        sink.flush().unwrap();
        assert_eq!(out.contents(), b"\x1b[1;1Hhi");
        assert!(sink.pending().is_empty());
    }

    #[test]
    fn test_fixed_size() {
        let (mut sink, _out) = MemorySink::memory(120, 40);
        assert_eq!(sink.size().unwrap(), (120, 40));
        sink.set_size(90, 30);
        assert_eq!(sink.size().unwrap(), (90, 30));
    }
}
