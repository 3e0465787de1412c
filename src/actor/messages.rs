//! Message types for actor communication.

use crate::footer::{GitInfo, StatsUpdate};
use std::path::PathBuf;

/// Events consumed by the footer actor.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// New usage numbers from the generation loop.
    Stats(StatsUpdate),
    /// New repository information.
    Git(GitInfo),
    /// The working directory changed.
    Path(PathBuf),
    /// The terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
    /// A response started (`true`) or finished (`false`) streaming.
    ///
    /// While streaming, footer redraws are throttled.
    Streaming(bool),
    /// Redraw the footer even if nothing changed.
    Redraw,
    /// Stop the actor.
    Shutdown,
}

impl CoordinatorEvent {
    /// Whether the event may be dropped when the queue is full.
    pub const fn is_lossy(&self) -> bool {
        matches!(self, Self::Stats(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stats_are_lossy() {
        assert!(CoordinatorEvent::Stats(StatsUpdate::default()).is_lossy());
        assert!(!CoordinatorEvent::Resize { width: 80, height: 24 }.is_lossy());
        assert!(!CoordinatorEvent::Git(GitInfo::not_a_repo()).is_lossy());
        assert!(!CoordinatorEvent::Shutdown.is_lossy());
    }
}
