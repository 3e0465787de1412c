//! Configuration for the streaming formatter, the footer and the coordinator.
//!
//! All limits have defaults tuned for interactive agent sessions. Every struct
//! deserializes with missing fields falling back to those defaults, so a host
//! can embed a partial `[render]` table in its own config file.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the streaming formatter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Minimum time between flushes when no other trigger fires (milliseconds).
    pub min_flush_delay_ms: u64,

    /// Buffered length that forces a flush.
    pub max_buffer_size: usize,

    /// Optional line printed when the first chunk of a session arrives.
    pub banner: Option<String>,

    /// Whether lines containing `{` or `[` go through the JSON highlighter.
    pub highlight_json: bool,

    /// Width of the rendered horizontal rule.
    pub rule_width: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            min_flush_delay_ms: 50,
            max_buffer_size: 100,
            banner: None,
            highlight_json: true,
            rule_width: 60,
        }
    }
}

impl StreamConfig {
    /// Minimum delay between time-triggered flushes.
    pub const fn min_flush_delay(&self) -> Duration {
        Duration::from_millis(self.min_flush_delay_ms)
    }

    /// Set the minimum flush delay.
    #[must_use]
    pub const fn with_min_flush_delay_ms(mut self, ms: u64) -> Self {
        self.min_flush_delay_ms = ms;
        self
    }

    /// Set the buffered length that forces a flush.
    #[must_use]
    pub const fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Print `banner` when a session receives its first chunk.
    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Enable or disable embedded JSON highlighting.
    #[must_use]
    pub const fn with_highlight_json(mut self, enabled: bool) -> Self {
        self.highlight_json = enabled;
        self
    }
}

/// Configuration for the status footer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    /// Terminal widths below this use the five-row narrow layout.
    pub narrow_threshold: u16,

    /// Minimum interval between footer redraws while streaming (milliseconds).
    pub throttle_ms: u64,

    /// Tick interval of the footer actor (milliseconds).
    pub tick_ms: u64,

    /// Capacity of the footer actor's event queue.
    pub queue_capacity: usize,

    /// Stacking order of the footer region.
    pub z_order: u8,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            narrow_threshold: 100,
            throttle_ms: 100,
            tick_ms: 50,
            queue_capacity: 100,
            z_order: 100,
        }
    }
}

impl FooterConfig {
    /// Redraw throttle while streaming.
    pub const fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Actor tick interval.
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Set the narrow-mode width threshold.
    #[must_use]
    pub const fn with_narrow_threshold(mut self, columns: u16) -> Self {
        self.narrow_threshold = columns;
        self
    }

    /// Set the streaming redraw throttle.
    #[must_use]
    pub const fn with_throttle_ms(mut self, ms: u64) -> Self {
        self.throttle_ms = ms;
        self
    }
}

/// Top-level configuration for a [`crate::Coordinator`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Streaming formatter settings.
    pub stream: StreamConfig,
    /// Footer settings.
    pub footer: FooterConfig,
    /// Number of plain lines retained by the content log.
    pub log_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            footer: FooterConfig::default(),
            log_capacity: 10_000,
        }
    }
}

impl CoordinatorConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the streaming settings.
    #[must_use]
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Replace the footer settings.
    #[must_use]
    pub fn with_footer(mut self, footer: FooterConfig) -> Self {
        self.footer = footer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.stream.min_flush_delay(), Duration::from_millis(50));
        assert_eq!(config.stream.max_buffer_size, 100);
        assert_eq!(config.footer.narrow_threshold, 100);
        assert_eq!(config.footer.throttle(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: CoordinatorConfig =
            serde_json::from_str(r#"{"stream": {"max_buffer_size": 40}, "footer": {"narrow_threshold": 80}}"#)
                .unwrap();
        assert_eq!(config.stream.max_buffer_size, 40);
        assert_eq!(config.stream.min_flush_delay_ms, 50);
        assert!(config.stream.highlight_json);
        assert_eq!(config.footer.narrow_threshold, 80);
        assert_eq!(config.log_capacity, 10_000);
    }

    #[test]
    fn test_builders() {
        let stream = StreamConfig::default()
            .with_min_flush_delay_ms(0)
            .with_banner("streaming")
            .with_highlight_json(false);
        assert_eq!(stream.min_flush_delay(), Duration::ZERO);
        assert_eq!(stream.banner.as_deref(), Some("streaming"));
        assert!(!stream.highlight_json);
    }
}
