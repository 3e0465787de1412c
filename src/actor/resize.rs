//! Resize watcher: polls the terminal size and reports changes.
//!
//! Polling keeps the watcher off the terminal's event stream, which belongs
//! to the host application (it reads keys from it).

use super::footer::FooterHandle;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Watcher actor that turns size changes into resize events.
pub struct ResizeWatcher {
    /// Handle to the watcher thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl ResizeWatcher {
    /// Spawn a watcher that calls `probe` every `interval` and sends a
    /// resize to `footer` whenever the answer differs from the last one.
    ///
    /// `initial` is the size the layout was built for.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the watcher thread.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn<F>(footer: FooterHandle, interval: Duration, initial: (u16, u16), probe: F) -> Self
    where
        F: Fn() -> io::Result<(u16, u16)> + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tidemark-resize".to_string())
            .spawn(move || {
                Self::run_loop(&footer, &shutdown_clone, interval, initial, &probe);
            })
            .expect("Failed to spawn resize thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Watch the controlling terminal through crossterm.
    pub fn terminal(footer: FooterHandle, interval: Duration, initial: (u16, u16)) -> Self {
        Self::spawn(footer, interval, initial, crossterm::terminal::size)
    }

    /// Signal the watcher to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the watcher thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop<F>(
        footer: &FooterHandle,
        shutdown: &Arc<AtomicBool>,
        interval: Duration,
        mut last: (u16, u16),
        probe: &F,
    ) where
        F: Fn() -> io::Result<(u16, u16)>,
    {
        while !shutdown.load(Ordering::Relaxed) {
            thread::sleep(interval);
            let size = match probe() {
                Ok(size) => size,
                Err(e) => {
                    warn!(error = %e, "terminal size query failed");
                    continue;
                }
            };
            if size == last || size.0 == 0 || size.1 == 0 {
                continue;
            }
            debug!(from = ?last, to = ?size, "terminal resized");
            if footer.resize(size.0, size.1).is_err() {
                // Footer actor is gone.
                break;
            }
            last = size;
        }
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
