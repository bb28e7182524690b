//! Test doubles for overlay hosts

use std::collections::BTreeMap;

use super::layout::Rect;
use super::reconciler::{OverlayHost, VisualHandle};
use super::style::OverlayStyle;
use super::tokenizer::Token;

/// Matched token texts, for comparing against string literals
pub fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Host that records overlay visuals and counts every call
#[derive(Debug, Default)]
pub struct RecordingHost {
    next: u64,
    live: BTreeMap<VisualHandle, (Rect, OverlayStyle)>,
    pub created: usize,
    pub removed: usize,
}

impl RecordingHost {
    /// Live visuals in creation order
    pub fn live(&self) -> Vec<(Rect, OverlayStyle)> {
        self.live.values().copied().collect()
    }

    /// Total create + remove calls so far
    pub fn calls(&self) -> usize {
        self.created + self.removed
    }
}

impl OverlayHost for RecordingHost {
    fn create_overlay(&mut self, rect: Rect, style: &OverlayStyle) -> VisualHandle {
        let handle = VisualHandle(self.next);
        self.next += 1;
        self.created += 1;
        self.live.insert(handle, (rect, *style));
        handle
    }

    fn remove_overlay(&mut self, handle: VisualHandle) {
        self.removed += 1;
        assert!(
            self.live.remove(&handle).is_some(),
            "removed unknown visual {:?}",
            handle
        );
    }
}
