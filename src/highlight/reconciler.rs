//! Highlight reconciler
//!
//! Owns the overlay set and keeps the host's overlay visuals in step with
//! the tokens in the text. Each cycle tokenizes, maps ranges to rectangles,
//! and only touches the host when the rectangle sequence changed.
//!
//! A cycle is Idle -> Reconciling -> Idle within one `reconcile` call.
//! `reconcile` takes `&mut self`, so a second cycle cannot start while one
//! is running.

use tracing::{debug, trace};

use super::diff::{compute_overlay_diff, OverlayDiff};
use super::layout::{map_to_rectangles, Rect, TextLayout};
use super::style::OverlayStyle;
use super::tokenizer::{Token, Tokenizer};

/// Opaque id of an overlay visual created by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

/// Host surface the reconciler draws on
pub trait OverlayHost {
    /// Create a background visual at `rect`, stacked below the text glyphs
    fn create_overlay(&mut self, rect: Rect, style: &OverlayStyle) -> VisualHandle;

    /// Remove a visual previously returned by `create_overlay`
    fn remove_overlay(&mut self, handle: VisualHandle);
}

/// Result of one reconcile cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Rectangles matched the rendered set, host untouched
    Unchanged,
    /// The rendered set was replaced
    Replaced { removed: usize, added: usize },
}

/// Overlay set owner and cycle driver
pub struct Reconciler {
    tokenizer: Tokenizer,
    style: OverlayStyle,
    /// Style changed since the visuals were built
    style_dirty: bool,
    overlay_set: Vec<Rect>,
    visuals: Vec<VisualHandle>,
    matched: Vec<Token>,
}

impl Reconciler {
    pub fn new(tokenizer: Tokenizer, style: OverlayStyle) -> Self {
        Self {
            tokenizer,
            style,
            style_dirty: false,
            overlay_set: Vec::new(),
            visuals: Vec::new(),
            matched: Vec::new(),
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Change overlay appearance; visuals are rebuilt on the next cycle
    pub fn set_style(&mut self, style: OverlayStyle) {
        if style != self.style {
            self.style = style;
            self.style_dirty = true;
        }
    }

    /// The currently rendered rectangles
    pub fn overlay_set(&self) -> &[Rect] {
        &self.overlay_set
    }

    /// Live visual handles, parallel to `overlay_set`
    pub fn visuals(&self) -> &[VisualHandle] {
        &self.visuals
    }

    /// Tokens matched by the most recent cycle, in text order
    pub fn matched_tokens(&self) -> &[Token] {
        &self.matched
    }

    /// Run one cycle against the current text and layout
    ///
    /// `text` is `None` when the host has no live text; that clears the
    /// highlights rather than failing.
    pub fn reconcile<L, H>(&mut self, text: Option<&str>, layout: &L, host: &mut H) -> CycleOutcome
    where
        L: TextLayout + ?Sized,
        H: OverlayHost + ?Sized,
    {
        let tokens = text
            .map(|t| self.tokenizer.find_matches(t))
            .unwrap_or_default();
        let rects: Vec<Rect> = tokens
            .iter()
            .flat_map(|token| map_to_rectangles(token.range, layout))
            .collect();
        self.matched = tokens;
        trace!(tokens = self.matched.len(), "tokens matched");

        let mut diff = compute_overlay_diff(&self.overlay_set, &rects);
        if diff.is_empty() && self.style_dirty && !rects.is_empty() {
            diff = OverlayDiff {
                to_remove: self.overlay_set.clone(),
                to_add: rects.clone(),
            };
        }
        self.style_dirty = false;

        if diff.is_empty() {
            CycleOutcome::Unchanged
        } else {
            self.apply(diff, host)
        }
    }

    fn apply<H: OverlayHost + ?Sized>(&mut self, diff: OverlayDiff, host: &mut H) -> CycleOutcome {
        let removed = self.visuals.len();
        for handle in self.visuals.drain(..) {
            host.remove_overlay(handle);
        }
        // Until every visual exists the rendered set counts as empty, so a
        // cycle cut short by the host is redone in full next time.
        self.overlay_set.clear();
        for rect in &diff.to_add {
            self.visuals.push(host.create_overlay(*rect, &self.style));
        }
        let added = diff.to_add.len();
        self.overlay_set = diff.to_add;
        debug!(removed, added, "overlay set replaced");
        CycleOutcome::Replaced { removed, added }
    }

    /// Remove every overlay visual and forget the overlay set
    pub fn teardown<H: OverlayHost + ?Sized>(&mut self, host: &mut H) {
        for handle in self.visuals.drain(..) {
            host.remove_overlay(handle);
        }
        self.overlay_set.clear();
        self.matched.clear();
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(Tokenizer::hashtags(), OverlayStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::layout::GridLayout;
    use crate::highlight::style::Color;
    use crate::highlight::testing::{texts, RecordingHost};
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_hello_world_wrapping_example() {
        // Width 20: "hello #world and #fo" | "o-bar"
        let text = "hello #world and #foo-bar";
        let layout = GridLayout::new(text, 20);
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();

        let outcome = reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Replaced { removed: 0, added: 3 });
        assert_eq!(
            reconciler.overlay_set(),
            &[
                Rect::new(6.0, 0.0, 6.0, 1.0),
                Rect::new(17.0, 0.0, 3.0, 1.0),
                Rect::new(0.0, 1.0, 5.0, 1.0),
            ]
        );
        assert_eq!(texts(reconciler.matched_tokens()), &["#world", "#foo-bar"]);
        assert_eq!(host.live().len(), 3);
    }

    #[test]
    fn test_second_cycle_is_idempotent() {
        let text = "#a #b";
        let layout = GridLayout::new(text, 80);
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();

        reconciler.reconcile(Some(text), &layout, &mut host);
        let set = reconciler.overlay_set().to_vec();
        let calls = host.calls();

        let outcome = reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Unchanged);
        assert_eq!(reconciler.overlay_set(), set.as_slice());
        assert_eq!(host.calls(), calls);
        assert_eq!(texts(reconciler.matched_tokens()), &["#a", "#b"]);
    }

    #[test]
    fn test_bounds_change_moves_overlays() {
        let text = "xxxx #tag";
        let mut layout = GridLayout::new(text, 80);
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        reconciler.reconcile(Some(text), &layout, &mut host);
        let before = reconciler.overlay_set().to_vec();

        layout.resize(6);
        let outcome = reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Replaced { removed: 1, added: 2 });
        assert_ne!(reconciler.overlay_set(), before.as_slice());
        assert_eq!(texts(reconciler.matched_tokens()), &["#tag"]);
        assert_eq!(host.live().len(), 2);
    }

    #[test]
    fn test_removing_last_token_clears_overlays() {
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        reconciler.reconcile(Some("#x"), &GridLayout::new("#x", 80), &mut host);
        assert_eq!(host.live().len(), 1);

        let outcome = reconciler.reconcile(Some("x"), &GridLayout::new("x", 80), &mut host);
        assert_eq!(outcome, CycleOutcome::Replaced { removed: 1, added: 0 });
        assert!(host.live().is_empty());
        assert!(reconciler.matched_tokens().is_empty());
    }

    #[test]
    fn test_absent_text_clears() {
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        let layout = GridLayout::new("#x", 80);
        reconciler.reconcile(Some("#x"), &layout, &mut host);
        reconciler.reconcile(None, &layout, &mut host);
        assert!(reconciler.overlay_set().is_empty());
        assert!(host.live().is_empty());
    }

    #[test]
    fn test_stale_layout_drops_rectangles() {
        // Layout still reflects an older, shorter text
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        let layout = GridLayout::new("ab", 80);
        let outcome = reconciler.reconcile(Some("ab #tag"), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Unchanged);
        assert_eq!(texts(reconciler.matched_tokens()), &["#tag"]);
        assert!(host.live().is_empty());
    }

    #[test]
    fn test_style_change_rebuilds_visuals() {
        let text = "#a";
        let layout = GridLayout::new(text, 80);
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        reconciler.reconcile(Some(text), &layout, &mut host);

        let style = OverlayStyle::default().with_color(Color::Blue);
        reconciler.set_style(style);
        let outcome = reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Replaced { removed: 1, added: 1 });
        assert_eq!(host.live()[0].1, style);

        let outcome = reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Unchanged);
    }

    #[test]
    fn test_teardown_removes_everything() {
        let text = "#a #b #c";
        let layout = GridLayout::new(text, 80);
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(host.live().len(), 3);

        reconciler.teardown(&mut host);
        assert!(host.live().is_empty());
        assert!(reconciler.overlay_set().is_empty());
        assert!(reconciler.visuals().is_empty());
    }

    #[test]
    fn test_disabled_tokenizer_renders_nothing() {
        let mut host = RecordingHost::default();
        let mut reconciler =
            Reconciler::new(Tokenizer::new_or_disabled("(#"), OverlayStyle::default());
        let outcome = reconciler.reconcile(Some("#tag"), &GridLayout::new("#tag", 80), &mut host);
        assert_eq!(outcome, CycleOutcome::Unchanged);
        assert_eq!(host.calls(), 0);
    }

    #[test]
    fn test_matched_tokens_carry_links() {
        let text = "#rust and #go";
        let mut host = RecordingHost::default();
        let mut reconciler = Reconciler::default();
        reconciler.reconcile(Some(text), &GridLayout::new(text, 80), &mut host);

        let links: Vec<String> = reconciler.matched_tokens().iter().map(|t| t.link()).collect();
        assert_eq!(links, vec!["hash:#rust", "hash:#go"]);
        assert_eq!(reconciler.matched_tokens()[1].range.offset, 10);
    }

    /// Host whose first `create_overlay` call panics
    #[derive(Default)]
    struct FailingHost {
        inner: RecordingHost,
        failed: bool,
    }

    impl OverlayHost for FailingHost {
        fn create_overlay(&mut self, rect: Rect, style: &OverlayStyle) -> VisualHandle {
            if !self.failed {
                self.failed = true;
                panic!("host refused overlay");
            }
            self.inner.create_overlay(rect, style)
        }

        fn remove_overlay(&mut self, handle: VisualHandle) {
            self.inner.remove_overlay(handle);
        }
    }

    #[test]
    fn test_cycle_recovers_after_host_panic() {
        let text = "#a #b";
        let layout = GridLayout::new(text, 80);
        let mut host = FailingHost::default();
        let mut reconciler = Reconciler::default();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            reconciler.reconcile(Some(text), &layout, &mut host)
        }));
        assert!(result.is_err());
        assert!(reconciler.overlay_set().is_empty());

        let outcome = reconciler.reconcile(Some(text), &layout, &mut host);
        assert_eq!(outcome, CycleOutcome::Replaced { removed: 0, added: 2 });
        assert_eq!(host.inner.live().len(), 2);
        assert_eq!(reconciler.visuals().len(), 2);
    }
}
