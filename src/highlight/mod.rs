//! Hashtag detection and highlight overlays
//!
//! This module provides:
//! - Token scanning over the whole text
//! - Mapping of token ranges to layout rectangles
//! - Reconciliation of rendered overlays against fresh rectangles

mod diff;
mod layout;
mod reconciler;
mod style;
mod tokenizer;

#[cfg(test)]
pub(crate) mod testing;

pub use diff::{compute_overlay_diff, OverlayDiff};
pub use layout::{map_to_rectangles, CellPos, GridLayout, Rect, TextLayout};
pub use reconciler::{CycleOutcome, OverlayHost, Reconciler, VisualHandle};
pub use style::{Color, OverlayStyle};
pub use tokenizer::{Token, TokenRange, Tokenizer, HASHTAG_PATTERN, TRIGGER};

pub(crate) use tokenizer::byte_offset;
