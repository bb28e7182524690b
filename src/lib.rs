//! hashpill - hashtag highlighting for text input fields
//!
//! Finds hashtags as the user types, maps them onto the wrapped text layout
//! and keeps background "pill" overlays in sync with them. An optional edit
//! gate keeps input hashtag-first.
//!
//! The host owns rendering: it implements [`OverlayHost`] to create and
//! remove overlay visuals, and [`TextLayout`] if it brings its own layout
//! engine instead of [`GridLayout`].

pub mod config;
pub mod error;
pub mod field;
pub mod gate;
pub mod highlight;
pub mod notify;

pub use config::Config;
pub use error::{HighlightError, Result};
pub use field::HashtagField;
pub use gate::{EditGate, Verdict};
pub use highlight::{
    compute_overlay_diff, map_to_rectangles, Color, CycleOutcome, GridLayout, OverlayDiff,
    OverlayHost, OverlayStyle, Rect, Reconciler, TextLayout, Token, TokenRange, Tokenizer,
    VisualHandle,
};
pub use notify::{ChangeEvent, ChangeNotifier, Subscription};
