//! `OutputLock`: serializes every write sequence against the terminal.

use crate::error::Result;
use crate::terminal::TerminalSink;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Exclusive access to the terminal sink.
pub type OutputGuard<'a> = MutexGuard<'a, Box<dyn TerminalSink>>;

/// The single mutual-exclusion resource shared by all renderers.
///
/// The sink lives inside the lock, so the only way to write to the terminal
/// is while holding it. Clones share the same lock. Hold it across a bounded
/// write sequence only; never across generation or network I/O.
#[derive(Clone)]
pub struct OutputLock {
    sink: Arc<Mutex<Box<dyn TerminalSink>>>,
}

impl OutputLock {
    /// Take ownership of a sink.
    pub fn new<S: TerminalSink + 'static>(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Acquire the lock.
    ///
    /// A writer that panicked mid-batch does not wedge the terminal: the
    /// poisoned guard is recovered.
    pub fn lock(&self) -> OutputGuard<'_> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one write batch under the lock and flush it before releasing.
    ///
    /// The flush happens even when `f` fails, so whatever `f` managed to
    /// queue (a cursor restore, for instance) still reaches the terminal.
    pub fn batch<R>(&self, f: impl FnOnce(&mut dyn TerminalSink) -> Result<R>) -> Result<R> {
        let mut guard = self.lock();
        let result = f(&mut **guard);
        let flushed = guard.flush();
        let value = result?;
        flushed?;
        Ok(value)
    }

    /// Query the terminal size.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        self.lock().size()
    }
}

impl std::fmt::Debug for OutputLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputLock").finish_non_exhaustive()
    }
}
