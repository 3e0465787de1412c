//! Status footer: model, usage, git and path rows docked at the bottom.
//!
//! # Layout
//!
//! ```text
//! wide (>= threshold)                    narrow (< threshold)
//! ┌───────────────────────────────┐      ┌──────────────────┐
//! │ separator                     │      │ separator        │
//! │ ~/path                        │      │ ~/path           │
//! │ remote:branch (+N)            │      │ branch (+N)      │
//! │ provider (model)   stats      │      │ provider (model) │
//! └───────────────────────────────┘      │            stats │
//!                                        └──────────────────┘
//! ```

mod format;
pub mod git;
mod renderer;
mod rows;
mod state;

pub use format::{
    extract_model_name, format_context, format_cost, format_duration, format_tokens, truncate_string,
};
pub use renderer::FooterRenderer;
pub use rows::{compose_rows, fit_model, footer_height};
pub use state::{FooterField, FooterListener, FooterState, FooterStore, GitInfo, StatsUpdate};
