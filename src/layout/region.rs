//! Region and component metadata handed out by the layout provider.

use super::rect::Rect;

/// A named rectangle plus stacking order and visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Position and size (0-based).
    pub rect: Rect,
    /// Z-order for overlays (higher = on top).
    pub z_order: u8,
    /// Whether the region is drawn at all.
    pub visible: bool,
}

impl Region {
    /// Create a visible region with z-order 0.
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            z_order: 0,
            visible: true,
        }
    }

    /// Set the z-order.
    #[must_use]
    pub const fn with_z_order(mut self, z: u8) -> Self {
        self.z_order = z;
        self
    }

    /// Column of the left edge.
    pub const fn x(&self) -> u16 {
        self.rect.x
    }

    /// Row of the top edge.
    pub const fn y(&self) -> u16 {
        self.rect.y
    }

    /// Width in columns.
    pub const fn width(&self) -> u16 {
        self.rect.width
    }

    /// Height in rows.
    pub const fn height(&self) -> u16 {
        self.rect.height
    }
}

/// Sizing and priority metadata a component registers with the layout.
///
/// Components docked at the bottom reserve `height` rows below the
/// scroll region; higher `priority` sits closer to the bottom edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Component name.
    pub name: String,
    /// Rows reserved below the content scroll region.
    pub height: u16,
    /// Ordering among docked components.
    pub priority: u8,
}

impl ComponentSpec {
    /// Create component metadata.
    pub fn new(name: impl Into<String>, height: u16, priority: u8) -> Self {
        Self {
            name: name.into(),
            height,
            priority,
        }
    }
}
