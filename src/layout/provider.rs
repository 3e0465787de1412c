//! Layout provider: owns region geometry and the content scroll region.

use super::rect::Rect;
use super::region::{ComponentSpec, Region};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Source of region geometry for the renderers.
///
/// Implementations are shared between threads; every read returns a copy
/// taken under the provider's own lock, so a renderer never observes a
/// region halfway through a resize.
pub trait LayoutProvider: Send + Sync {
    /// Define (or redefine) a named region.
    fn define_region(&self, name: &str, region: Region) -> Result<()>;

    /// Update an existing region.
    fn update_region(&self, name: &str, region: Region) -> Result<()>;

    /// Get a copy of a named region.
    fn region(&self, name: &str) -> Result<Region>;

    /// Top and bottom rows (1-based, inclusive) of the content scroll region.
    fn scroll_region(&self) -> (u16, u16);

    /// Register or replace a component's sizing metadata.
    fn register_component(&self, spec: ComponentSpec);

    /// Current terminal size as `(width, height)`.
    fn terminal_size(&self) -> (u16, u16);

    /// Record a new terminal size.
    fn resize(&self, width: u16, height: u16);
}

#[derive(Debug)]
struct LayoutState {
    regions: HashMap<String, Region>,
    components: Vec<ComponentSpec>,
    terminal_size: (u16, u16),
    generation: u64,
}

/// Layout with bottom-docked components under a single scroll region.
#[derive(Debug)]
pub struct ScreenLayout {
    state: RwLock<LayoutState>,
}

impl ScreenLayout {
    /// Create a layout for the given terminal size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: RwLock::new(LayoutState {
                regions: HashMap::new(),
                components: Vec::new(),
                terminal_size: (width, height),
                generation: 0,
            }),
        }
    }

    /// Number of resizes seen so far.
    pub fn generation(&self) -> u64 {
        self.state.read().unwrap_or_else(PoisonError::into_inner).generation
    }

    /// Rows reserved by registered components.
    pub fn reserved_rows(&self) -> u16 {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.components.iter().map(|c| c.height).sum()
    }

    /// Names of the defined regions, sorted.
    pub fn region_names(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = state.regions.keys().cloned().collect();
        names.sort();
        names
    }

    fn validate(name: &str, region: &Region, (width, height): (u16, u16)) -> Result<()> {
        if region.rect.is_empty() {
            return Err(Error::InvalidRegion {
                name: name.to_string(),
                reason: format!("zero-sized {:?}", region.rect),
            });
        }
        if region.rect.right() > width || region.rect.bottom() > height {
            return Err(Error::InvalidRegion {
                name: name.to_string(),
                reason: format!("{:?} exceeds terminal {width}x{height}", region.rect),
            });
        }
        Ok(())
    }
}

impl LayoutProvider for ScreenLayout {
    fn define_region(&self, name: &str, region: Region) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        Self::validate(name, &region, state.terminal_size)?;
        state.regions.insert(name.to_string(), region);
        Ok(())
    }

    fn update_region(&self, name: &str, region: Region) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.regions.contains_key(name) {
            return Err(Error::RegionNotFound(name.to_string()));
        }
        Self::validate(name, &region, state.terminal_size)?;
        state.regions.insert(name.to_string(), region);
        Ok(())
    }

    fn region(&self, name: &str) -> Result<Region> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .regions
            .get(name)
            .copied()
            .ok_or_else(|| Error::RegionNotFound(name.to_string()))
    }

    fn scroll_region(&self) -> (u16, u16) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let reserved: u16 = state.components.iter().map(|c| c.height).sum();
        let bottom = state.terminal_size.1.saturating_sub(reserved).max(1);
        (1, bottom)
    }

    fn register_component(&self, spec: ComponentSpec) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = state.components.iter_mut().find(|c| c.name == spec.name) {
            *existing = spec;
        } else {
            state.components.push(spec);
        }
        state.components.sort_by_key(|c| c.priority);
    }

    fn terminal_size(&self) -> (u16, u16) {
        self.state.read().unwrap_or_else(PoisonError::into_inner).terminal_size
    }

    fn resize(&self, width: u16, height: u16) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.terminal_size = (width, height);
        state.generation += 1;
        // Regions no longer on screen are dropped until their owner redefines them.
        let screen = Rect::from_size(width, height);
        state
            .regions
            .retain(|_, r| r.rect.right() <= screen.width && r.rect.bottom() <= screen.height);
        debug!(width, height, generation = state.generation, "layout resized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lookup_before_define_fails() {
        let layout = ScreenLayout::new(80, 24);
        assert!(matches!(layout.region("footer"), Err(Error::RegionNotFound(_))));
    }

    #[test]
    fn test_define_and_update() {
        let layout = ScreenLayout::new(80, 24);
        let region = Region::new(Rect::new(0, 20, 80, 4)).with_z_order(100);
        layout.define_region("footer", region).unwrap();
        assert_eq!(layout.region("footer").unwrap(), region);

        let moved = Region::new(Rect::new(0, 19, 80, 5));
        layout.update_region("footer", moved).unwrap();
        assert_eq!(layout.region("footer").unwrap().height(), 5);
        assert!(matches!(
            layout.update_region("missing", moved),
            Err(Error::RegionNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_offscreen_region() {
        let layout = ScreenLayout::new(80, 24);
        let result = layout.define_region("footer", Region::new(Rect::new(0, 22, 80, 4)));
        assert!(matches!(result, Err(Error::InvalidRegion { .. })));
        let result = layout.define_region("empty", Region::new(Rect::ZERO));
        assert!(matches!(result, Err(Error::InvalidRegion { .. })));
    }

    #[test]
    fn test_scroll_region_excludes_components() {
        let layout = ScreenLayout::new(80, 24);
        assert_eq!(layout.scroll_region(), (1, 24));
        layout.register_component(ComponentSpec::new("footer", 4, 100));
        assert_eq!(layout.scroll_region(), (1, 20));
        layout.register_component(ComponentSpec::new("footer", 5, 100));
        assert_eq!(layout.scroll_region(), (1, 19));
        assert_eq!(layout.reserved_rows(), 5);
    }

    #[test]
    fn test_resize_drops_offscreen_regions() {
        let layout = ScreenLayout::new(80, 24);
        layout.define_region("footer", Region::new(Rect::new(0, 20, 80, 4))).unwrap();
        layout.resize(60, 10);
        assert_eq!(layout.terminal_size(), (60, 10));
        assert_eq!(layout.generation(), 1);
        assert!(layout.region_names().is_empty());
    }
}
