//! Hashtag text field
//!
//! Composes the text buffer, its layout snapshot, the edit gate and the
//! highlight reconciler. Every accepted edit and every bounds change is
//! announced through the field's `ChangeNotifier`; the field settles those
//! notifications (runs a reconcile cycle) before the call returns.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

use tracing::debug;

use crate::config::Config;
use crate::error::{HighlightError, Result};
use crate::gate::{EditGate, Verdict};
use crate::highlight::{
    byte_offset, GridLayout, OverlayHost, OverlayStyle, Rect, Reconciler, Token, Tokenizer,
};
use crate::notify::{ChangeEvent, ChangeNotifier, Subscription};

/// Notifications received but not yet settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pending {
    text: bool,
    bounds: bool,
}

impl Pending {
    fn is_empty(&self) -> bool {
        !self.text && !self.bounds
    }
}

/// Text input that highlights hashtags through an `OverlayHost`
pub struct HashtagField<H: OverlayHost> {
    text: String,
    /// Caret position in characters
    caret: usize,
    layout: GridLayout,
    gate: EditGate,
    reconciler: Reconciler,
    host: H,
    notifier: ChangeNotifier,
    pending: Rc<Cell<Pending>>,
    subscription: Option<Subscription>,
}

impl<H: OverlayHost> HashtagField<H> {
    /// Create an empty field drawing on `host`
    pub fn new(host: H, config: &Config) -> Result<Self> {
        Self::with_notifier(host, config, ChangeNotifier::new())
    }

    /// Create a field that listens on an existing notifier
    ///
    /// Events other parties raise on `notifier` are queued; the host calls
    /// [`settle`](Self::settle) once it has finished notifying. Fails if the
    /// listener cannot be registered.
    pub fn with_notifier(host: H, config: &Config, notifier: ChangeNotifier) -> Result<Self> {
        let pending = Rc::new(Cell::new(Pending::default()));
        let sink = Rc::clone(&pending);
        let subscription = notifier.subscribe(move |event| {
            let mut p = sink.get();
            match event {
                ChangeEvent::TextChanged => p.text = true,
                ChangeEvent::BoundsChanged => p.bounds = true,
            }
            sink.set(p);
        })?;

        let tokenizer = Tokenizer::new_or_disabled(&config.pattern);
        let style = OverlayStyle::new(config.highlight_color, config.corner_radius);
        Ok(Self {
            text: String::new(),
            caret: 0,
            layout: GridLayout::new("", config.wrap_width),
            gate: EditGate::new(config.restrict_to_hashtag_prefix),
            reconciler: Reconciler::new(tokenizer, style),
            host,
            notifier,
            pending,
            subscription: Some(subscription),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Tokens matched by the latest cycle, with their ranges and links
    pub fn matched_tokens(&self) -> &[Token] {
        self.reconciler.matched_tokens()
    }

    /// Rectangles currently rendered as overlays
    pub fn overlay_set(&self) -> &[Rect] {
        self.reconciler.overlay_set()
    }

    pub fn is_restricted(&self) -> bool {
        self.gate.restrict_to_hashtag_prefix
    }

    pub fn set_restricted(&mut self, restricted: bool) {
        self.gate.restrict_to_hashtag_prefix = restricted;
    }

    /// Change overlay appearance and redraw with it
    pub fn set_style(&mut self, style: OverlayStyle) {
        self.reconciler.set_style(style);
        self.refresh();
    }

    /// Replace `range` (in characters) with `replacement` if the gate allows
    ///
    /// Returns `true` when the edit was applied.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &str) -> bool {
        matches!(self.apply_edit(range, replacement), Ok(v) if v.is_accepted())
    }

    /// Like `replace_range`, but reports which gate rule decided
    ///
    /// A rejected edit leaves the text, caret and overlays untouched.
    pub fn apply_edit(&mut self, range: Range<usize>, replacement: &str) -> Result<Verdict> {
        let (start, end) = self.byte_range(&range)?;
        let verdict = self.gate.evaluate(&self.text, range.clone(), replacement);
        if !verdict.is_accepted() {
            debug!(replacement, reason = verdict.reason(), "edit rejected");
            return Ok(verdict);
        }

        self.text.replace_range(start..end, replacement);
        let inserted = replacement.chars().count();
        self.caret = if self.caret <= range.start {
            self.caret
        } else if self.caret >= range.end {
            self.caret - range.len() + inserted
        } else {
            range.start + inserted
        };
        self.notifier.notify(ChangeEvent::TextChanged);
        self.settle();
        Ok(verdict)
    }

    /// Insert at the caret and move the caret past the insertion
    pub fn insert_at_caret(&mut self, s: &str) -> Result<Verdict> {
        let at = self.caret;
        let verdict = self.apply_edit(at..at, s)?;
        if verdict.is_accepted() {
            self.caret = at + s.chars().count();
        }
        Ok(verdict)
    }

    /// Delete the character before the caret
    pub fn delete_backward(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let at = self.caret;
        self.replace_range(at - 1..at, "")
    }

    /// Delete the character after the caret
    pub fn delete_forward(&mut self) -> bool {
        if self.caret >= self.char_count() {
            return false;
        }
        let at = self.caret;
        self.replace_range(at..at + 1, "")
    }

    pub fn move_caret_left(&mut self) {
        self.caret = self.caret.saturating_sub(1);
    }

    pub fn move_caret_right(&mut self) {
        self.caret = (self.caret + 1).min(self.char_count());
    }

    pub fn move_caret_to(&mut self, char_idx: usize) {
        self.caret = char_idx.min(self.char_count());
    }

    /// Replace the whole text without consulting the gate
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.caret = self.text.chars().count();
        self.notifier.notify(ChangeEvent::TextChanged);
        self.settle();
    }

    /// Change the wrap width
    pub fn resize(&mut self, columns: usize) {
        if columns.max(1) == self.layout.columns() {
            return;
        }
        self.layout.resize(columns);
        self.notifier.notify(ChangeEvent::BoundsChanged);
        self.settle();
    }

    /// Run a cycle even though nothing was announced
    pub fn refresh(&mut self) {
        if self.subscription.is_none() {
            return;
        }
        self.reconciler
            .reconcile(Some(&self.text), &self.layout, &mut self.host);
    }

    /// Remove all overlays and stop listening for changes
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn teardown(&mut self) {
        self.reconciler.teardown(&mut self.host);
        if self.subscription.take().is_some() {
            debug!("hashtag field torn down");
        }
        self.pending.set(Pending::default());
    }

    fn byte_range(&self, range: &Range<usize>) -> Result<(usize, usize)> {
        let invalid = || {
            HighlightError::Message(format!(
                "edit range {}..{} outside text of {} characters",
                range.start,
                range.end,
                self.char_count()
            ))
        };
        if range.start > range.end {
            return Err(invalid());
        }
        let start = byte_offset(&self.text, range.start).ok_or_else(invalid)?;
        let end = byte_offset(&self.text, range.end).ok_or_else(invalid)?;
        Ok((start, end))
    }

    /// Check if notifications are waiting for `settle`
    pub fn has_pending(&self) -> bool {
        !self.pending.get().is_empty()
    }

    /// Drain pending notifications, one reconcile cycle per drained batch
    ///
    /// Edits, `set_text` and `resize` settle on their own. Hosts that raise
    /// events on a shared notifier call this afterwards. Notifications raised
    /// while a batch is processed land in the next batch instead of starting
    /// a nested cycle. Returns `true` if at least one cycle ran.
    pub fn settle(&mut self) -> bool {
        if self.subscription.is_none() {
            return false;
        }
        let mut ran = false;
        loop {
            let pending = self.pending.replace(Pending::default());
            if pending.is_empty() {
                break;
            }
            if pending.text {
                self.layout.set_text(&self.text);
            }
            self.reconciler
                .reconcile(Some(&self.text), &self.layout, &mut self.host);
            ran = true;
        }
        ran
    }
}

impl<H: OverlayHost> Drop for HashtagField<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
