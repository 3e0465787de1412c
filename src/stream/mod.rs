//! Streaming formatter: turns incremental model output into styled lines.
//!
//! # Architecture
//!
//! ```text
//!  chunk ──▶ filter ──▶ pending ──[flush policy]──▶ split on '\n'
//!                                                    │
//!                         incomplete tail ◀──────────┤
//!                         (line carry)               ▼
//!                                        content log ◀── complete line
//!                                                    │
//!                                                    ▼
//!                                   LineStyler ──▶ OutputLock ──▶ terminal
//! ```
//!
//! Markdown state that spans chunks (fenced code, list context) lives in
//! [`LineStyler`] and only changes while a flush is in progress.

mod content_log;
mod filter;
mod formatter;
mod json;
mod markdown;

pub use content_log::{ConsoleBuffer, ContentLog};
pub use filter::filter_chunk;
pub use formatter::{should_flush, StreamingFormatter};
pub use json::JsonHighlighter;
pub use markdown::{classify, format_inline, BlockMode, HeadingLevel, LineKind, LineStyler, ListContext};
