//! Hashtag tokenizer
//!
//! Scans the whole text with a single regex pass and reports each match as
//! a character range. Ranges are recomputed from scratch on every change and
//! are never carried across edits.

use regex::Regex;
use tracing::warn;

use crate::error::Result;

/// The trigger character that starts every token
pub const TRIGGER: char = '#';

/// Default hashtag pattern: trigger followed by one or more of `[-_0-9A-Za-z]`
pub const HASHTAG_PATTERN: &str = "#[-_0-9A-Za-z]+";

/// A token location in character units (Unicode scalar values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenRange {
    /// Character offset of the first character
    pub offset: usize,
    /// Length in characters
    pub len: usize,
}

impl TokenRange {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Character offset one past the last character, saturating
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.len)
    }

    /// Character offset one past the last character, `None` on overflow
    pub fn checked_end(&self) -> Option<usize> {
        self.offset.checked_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether two ranges share at least one character
    pub fn overlaps(&self, other: &TokenRange) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }

    /// The substring this range denotes, or `None` if it no longer fits `text`
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = byte_offset(text, self.offset)?;
        let end = byte_offset(text, self.checked_end()?)?;
        Some(&text[start..end])
    }
}

/// Byte index of a character offset; `None` when past the end
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    match text.char_indices().nth(char_offset) {
        Some((idx, _)) => Some(idx),
        None if text.chars().count() == char_offset => Some(text.len()),
        None => None,
    }
}

/// A matched token: where it is and what it says
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub range: TokenRange,
    pub text: String,
}

impl Token {
    /// Token text without the leading trigger
    pub fn name(&self) -> &str {
        self.text.strip_prefix(TRIGGER).unwrap_or(&self.text)
    }

    /// Link target hosts can attach to the token (`hash:#tag`)
    pub fn link(&self) -> String {
        format!("hash:{}", self.text)
    }
}

/// Regex-driven token scanner
///
/// A tokenizer whose pattern failed to compile is *disabled*: it reports no
/// tokens at all instead of failing, so a bad pattern only turns off
/// highlighting.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Option<Regex>,
}

impl Tokenizer {
    /// Tokenizer for the standard hashtag pattern
    pub fn hashtags() -> Self {
        Self::new_or_disabled(HASHTAG_PATTERN)
    }

    /// Compile a custom token pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            pattern: Some(regex),
        })
    }

    /// Compile a custom pattern, falling back to a disabled tokenizer
    pub fn new_or_disabled(pattern: &str) -> Self {
        match Self::new(pattern) {
            Ok(tokenizer) => tokenizer,
            Err(e) => {
                warn!(pattern, error = %e, "token pattern rejected, highlighting disabled");
                Self::disabled()
            }
        }
    }

    /// A tokenizer that never matches
    pub fn disabled() -> Self {
        Self { pattern: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }

    /// Source of the active pattern
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|r| r.as_str())
    }

    /// Find all token ranges in `text`, ordered by offset
    pub fn find_tokens(&self, text: &str) -> Vec<TokenRange> {
        self.find_matches(text).into_iter().map(|t| t.range).collect()
    }

    /// Like `find_tokens`, but absent text yields no tokens
    pub fn find_tokens_in(&self, text: Option<&str>) -> Vec<TokenRange> {
        text.map(|t| self.find_tokens(t)).unwrap_or_default()
    }

    /// Find all tokens in `text` together with their matched text
    pub fn find_matches(&self, text: &str) -> Vec<Token> {
        let Some(regex) = &self.pattern else {
            return Vec::new();
        };

        // Byte offsets from the regex are converted to character offsets
        // incrementally so the whole scan stays linear.
        let mut tokens = Vec::new();
        let mut last_byte = 0;
        let mut last_char = 0;
        for m in regex.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }
            let offset = last_char + text[last_byte..m.start()].chars().count();
            let len = m.as_str().chars().count();
            tokens.push(Token {
                range: TokenRange::new(offset, len),
                text: m.as_str().to_string(),
            });
            last_byte = m.end();
            last_char = offset + len;
        }
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::hashtags()
    }
}
