//! Layout module: named screen regions and the content scroll region.
//!
//! Regions are recomputed on terminal resize. Renderers only ever read a
//! copy of a region; the provider is the single writer.

mod provider;
mod rect;
mod region;

pub use provider::{LayoutProvider, ScreenLayout};
pub use rect::Rect;
pub use region::{ComponentSpec, Region};

/// Name of the footer region.
pub const FOOTER_REGION: &str = "footer";
