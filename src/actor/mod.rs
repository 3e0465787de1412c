//! Actors: the threads that keep the footer current without blocking the
//! streaming path.
//!
//! ```text
//! ┌──────────────┐   Stats/Git/Path    ┌──────────────┐   render()   ┌──────────┐
//! │  Agent loop  │ ──────────────────▶ │ Footer Actor │ ───────────▶ │  Footer  │
//! └──────────────┘                     │              │              └──────────┘
//! ┌──────────────┐       Resize        │              │ handle_resize
//! │Resize Watcher│ ──────────────────▶ │              │ ───────────▶ Coordinator
//! └──────────────┘                     └──────────────┘
//! ```
//!
//! Streamed text never goes through a queue: the formatter writes under the
//! output lock on the caller's thread.

mod footer;
mod messages;
mod resize;

pub use footer::{FooterActor, FooterHandle};
pub use messages::CoordinatorEvent;
pub use resize::ResizeWatcher;
