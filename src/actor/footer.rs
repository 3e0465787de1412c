//! Footer actor: applies footer events and paces redraws on its own thread.
//!
//! Producers never render the footer themselves. They send
//! [`CoordinatorEvent`]s through a [`FooterHandle`]; the actor folds them into
//! the footer state and redraws at most once per throttle interval while a
//! response is streaming, immediately otherwise.

use super::messages::CoordinatorEvent;
use crate::coordinator::Coordinator;
use crate::error::{Error, Result};
use crate::footer::{GitInfo, StatsUpdate};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Cloneable sending side of the footer actor's queue.
#[derive(Debug, Clone)]
pub struct FooterHandle {
    sender: Sender<CoordinatorEvent>,
}

impl FooterHandle {
    pub(crate) const fn from_sender(sender: Sender<CoordinatorEvent>) -> Self {
        Self { sender }
    }

    /// Send an event. Lossy events are dropped when the queue is full;
    /// everything else waits for room.
    ///
    /// Returns whether the event was queued.
    pub fn send(&self, event: CoordinatorEvent) -> Result<bool> {
        if event.is_lossy() {
            return match self.sender.try_send(event) {
                Ok(()) => Ok(true),
                Err(TrySendError::Full(event)) => {
                    debug!(?event, "footer queue full, dropping update");
                    Ok(false)
                }
                Err(TrySendError::Disconnected(_)) => Err(Error::ChannelClosed),
            };
        }
        self.sender.send(event).map_err(|_| Error::ChannelClosed)?;
        Ok(true)
    }

    /// Queue a stats update; dropped if the queue is full.
    pub fn update_stats(&self, update: StatsUpdate) -> Result<bool> {
        self.send(CoordinatorEvent::Stats(update))
    }

    /// Queue new git information.
    pub fn update_git(&self, git: GitInfo) -> Result<()> {
        self.send(CoordinatorEvent::Git(git)).map(drop)
    }

    /// Queue a working-directory change.
    pub fn update_path(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(CoordinatorEvent::Path(path.into())).map(drop)
    }

    /// Queue a resize. Always delivered.
    pub fn resize(&self, width: u16, height: u16) -> Result<()> {
        self.send(CoordinatorEvent::Resize { width, height }).map(drop)
    }

    /// Tell the actor whether a response is streaming.
    pub fn set_streaming(&self, streaming: bool) -> Result<()> {
        self.send(CoordinatorEvent::Streaming(streaming)).map(drop)
    }

    /// Ask for a redraw.
    pub fn redraw(&self) -> Result<()> {
        self.send(CoordinatorEvent::Redraw).map(drop)
    }
}

/// Footer actor thread.
pub struct FooterActor {
    /// Handle to the actor thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Sending side kept for handles and the shutdown message.
    sender: Sender<CoordinatorEvent>,
}

/// Redraw pacing state.
struct Pacer {
    streaming: bool,
    throttle: Duration,
    last_render: Option<Instant>,
}

impl Pacer {
    fn due(&self, now: Instant) -> bool {
        !self.streaming
            || self
                .last_render
                .map_or(true, |at| now.saturating_duration_since(at) >= self.throttle)
    }
}

impl FooterActor {
    /// Spawn the actor for `coordinator`'s footer.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the thread.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(coordinator: Coordinator) -> Self {
        let footer_config = coordinator.config().footer.clone();
        let (sender, receiver) = bounded(footer_config.queue_capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tidemark-footer".to_string())
            .spawn(move || {
                let pacer = Pacer {
                    streaming: false,
                    throttle: footer_config.throttle(),
                    last_render: None,
                };
                Self::run_loop(&coordinator, &receiver, &shutdown_clone, pacer, footer_config.tick());
            })
            .expect("Failed to spawn footer thread");

        Self {
            handle: Some(handle),
            shutdown,
            sender,
        }
    }

    /// A handle for sending events to this actor.
    pub fn handle(&self) -> FooterHandle {
        FooterHandle::from_sender(self.sender.clone())
    }

    /// Signal the actor to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the actor after it drains what is already queued and draws any
    /// pending footer state, and wait.
    pub fn join(mut self) {
        let _ = self.sender.send(CoordinatorEvent::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main actor loop.
    fn run_loop(
        coordinator: &Coordinator,
        receiver: &Receiver<CoordinatorEvent>,
        shutdown: &Arc<AtomicBool>,
        mut pacer: Pacer,
        tick: Duration,
    ) {
        let footer = coordinator.footer();
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            match receiver.recv_timeout(tick) {
                Ok(CoordinatorEvent::Shutdown) => {
                    // Whatever the throttle held back still gets drawn.
                    if let Err(e) = footer.render_if_dirty() {
                        warn!(error = %e, "final footer render failed");
                    }
                    break;
                }
                Ok(CoordinatorEvent::Stats(update)) => {
                    footer.update_stats(&update);
                }
                Ok(CoordinatorEvent::Git(git)) => footer.update_git(git),
                Ok(CoordinatorEvent::Path(path)) => footer.update_path(path),
                Ok(CoordinatorEvent::Streaming(streaming)) => pacer.streaming = streaming,
                Ok(CoordinatorEvent::Redraw) => footer.store().mark_dirty(),
                Ok(CoordinatorEvent::Resize { width, height }) => {
                    // Resize redraws the footer itself, unthrottled.
                    if let Err(e) = coordinator.handle_resize(width, height) {
                        warn!(error = %e, width, height, "resize failed");
                    }
                    pacer.last_render = Some(Instant::now());
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let now = Instant::now();
            if footer.needs_redraw() && pacer.due(now) {
                match footer.render() {
                    Ok(()) => trace!("footer redrawn"),
                    Err(e) => warn!(error = %e, "footer render failed"),
                }
                pacer.last_render = Some(now);
            }
        }
        debug!("footer actor stopped");
    }
}

impl Drop for FooterActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
