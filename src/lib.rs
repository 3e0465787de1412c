//! # Tidemark
//!
//! Streaming markdown output and a live status footer for agent CLIs,
//! sharing one terminal without tearing each other's lines.
//!
//! Model output arrives in arbitrary chunks. The [`StreamingFormatter`]
//! buffers it, flushes whole lines at natural boundaries and styles each one
//! (headings, lists, code blocks, inline spans, embedded JSON). Meanwhile the
//! [`FooterRenderer`] keeps a four or five row status block pinned below a
//! scroll region. Every write to the terminal goes through one
//! [`OutputLock`], so a footer frame and a formatter flush never interleave.
//!
//! ## Core Concepts
//!
//! - **Scroll region**: streamed text scrolls above the footer, which stays put
//! - **Line carry**: an unterminated tail is held until its newline arrives
//! - **Dirty tracking**: footer setters never draw; the footer actor does
//! - **Actor model**: footer updates and resize polling run on their own threads
//!
//! ## Example
//!
//! ```rust,ignore
//! use tidemark::{Coordinator, CoordinatorConfig, StdoutSink};
//!
//! let coordinator = Coordinator::new(StdoutSink::stdout(), CoordinatorConfig::default())?;
//! coordinator.setup()?;
//! let footer = coordinator.spawn_footer_actor();
//!
//! coordinator.formatter().write("# Plan\n- read the file\n")?;
//! coordinator.formatter().finalize()?;
//!
//! footer.join();
//! coordinator.teardown()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod footer;
pub mod layout;
pub mod logging;
pub mod stream;
pub mod style;
pub mod sync;
pub mod terminal;

// Re-exports for convenience
pub use actor::{CoordinatorEvent, FooterActor, FooterHandle, ResizeWatcher};
pub use config::{CoordinatorConfig, FooterConfig, StreamConfig};
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use footer::{FooterField, FooterRenderer, FooterState, GitInfo, StatsUpdate};
pub use layout::{ComponentSpec, LayoutProvider, Rect, Region, ScreenLayout};
pub use stream::{ConsoleBuffer, ContentLog, StreamingFormatter};
pub use style::{Color, Modifiers, Rgb, Style};
pub use sync::{ContentCursor, OutputLock};
pub use terminal::{AnsiSink, MemorySink, SharedBuffer, StdoutSink, TerminalSink};
