//! Edit gate for hashtag-first input
//!
//! Decides, before an edit is applied, whether it may happen at all. The
//! decision depends only on the current text, the edited range and the
//! replacement; nothing is remembered between calls.

use std::ops::Range;

use tracing::debug;

use crate::highlight::TRIGGER;

/// The rule that decided an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Restriction mode is off
    Unrestricted,
    /// Deletions always go through
    Deletion,
    /// Empty text may only start with the trigger
    EmptyNeedsTrigger,
    /// A line break may not directly follow a trigger
    LineBreakAfterTrigger,
    /// Two triggers in a row
    DoubleTrigger,
    /// A word after a space must start with the trigger
    WordNeedsTrigger,
    /// No rule objected
    Allowed,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            Verdict::Unrestricted | Verdict::Deletion | Verdict::Allowed
        )
    }

    /// Short explanation suitable for a status line
    pub fn reason(&self) -> &'static str {
        match self {
            Verdict::Unrestricted => "unrestricted",
            Verdict::Deletion => "deletion",
            Verdict::EmptyNeedsTrigger => "input must start with #",
            Verdict::LineBreakAfterTrigger => "no line break right after #",
            Verdict::DoubleTrigger => "no consecutive #",
            Verdict::WordNeedsTrigger => "new words must start with #",
            Verdict::Allowed => "allowed",
        }
    }
}

/// Hashtag-prefix edit gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditGate {
    pub restrict_to_hashtag_prefix: bool,
}

impl EditGate {
    pub fn new(restrict_to_hashtag_prefix: bool) -> Self {
        Self {
            restrict_to_hashtag_prefix,
        }
    }

    /// Check if replacing `range` (in characters) of `current` with
    /// `replacement` should be allowed
    pub fn should_accept_edit(&self, current: &str, range: Range<usize>, replacement: &str) -> bool {
        let verdict = self.evaluate(current, range, replacement);
        if !verdict.is_accepted() {
            debug!(replacement, reason = verdict.reason(), "edit rejected");
        }
        verdict.is_accepted()
    }

    /// Evaluate the rules in order; the first one that applies decides
    ///
    /// Replacements are compared against single characters by whole-string
    /// equality, so a multi-character insertion such as `"tag "` after a
    /// space is judged as "not the trigger".
    pub fn evaluate(&self, current: &str, range: Range<usize>, replacement: &str) -> Verdict {
        if !self.restrict_to_hashtag_prefix {
            return Verdict::Unrestricted;
        }
        if replacement.is_empty() {
            return Verdict::Deletion;
        }

        let is_trigger = single_char(replacement) == Some(TRIGGER);
        if current.is_empty() {
            return if is_trigger {
                Verdict::Allowed
            } else {
                Verdict::EmptyNeedsTrigger
            };
        }

        let preceding = range
            .start
            .checked_sub(1)
            .and_then(|idx| current.chars().nth(idx));
        match preceding {
            Some(TRIGGER) if replacement == "\n" => Verdict::LineBreakAfterTrigger,
            Some(TRIGGER) if is_trigger => Verdict::DoubleTrigger,
            Some(' ') if !is_trigger => Verdict::WordNeedsTrigger,
            _ => Verdict::Allowed,
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
