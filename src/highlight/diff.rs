//! Overlay set diffing
//!
//! Overlay sets are compared as whole sequences. Any difference at all
//! replaces the entire set; there is no per-rectangle patching.

use super::layout::Rect;

/// What has to happen to move the rendered overlays from one set to another
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayDiff {
    /// Rectangles whose visuals must be removed
    pub to_remove: Vec<Rect>,
    /// Rectangles that need a new visual, in render order
    pub to_add: Vec<Rect>,
}

impl OverlayDiff {
    /// Check if applying this diff would touch the host at all
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the diff between the rendered set and a freshly computed one
///
/// Equality is order-sensitive: the same rectangles in a different order
/// count as a change.
pub fn compute_overlay_diff(old: &[Rect], new: &[Rect]) -> OverlayDiff {
    if old == new {
        return OverlayDiff::default();
    }
    OverlayDiff {
        to_remove: old.to_vec(),
        to_add: new.to_vec(),
    }
}
