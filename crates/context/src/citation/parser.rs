//! Citation tag extraction
//!
//! Locates `[doc_id: L1, L2]` tags in free-form model output. Parsing is pure
//! syntax; deciding which tags are valid belongs to the validator.

use regex_lite::Regex;
use std::borrow::Cow;

/// Tag syntax the model is instructed to emit.
pub const CITATION_PATTERN: &str = r"\[([a-zA-Z0-9_-]+):\s*([L\d\s,]+)\s*\]";

const DIGITS_PATTERN: &str = r"\d+";

/// A citation tag as it appeared in the text, with non-ASCII whitespace
/// folded to plain spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCitation {
    pub doc_id: String,
    pub line_list: String,
}

#[derive(Debug, Clone)]
pub struct CitationParser {
    tag: Regex,
    digits: Regex,
}

impl CitationParser {
    pub fn new() -> Result<Self, regex_lite::Error> {
        Ok(Self {
            tag: Regex::new(CITATION_PATTERN)?,
            digits: Regex::new(DIGITS_PATTERN)?,
        })
    }

    /// Every well-formed tag, in order of appearance.
    ///
    /// `\s` in the pattern only covers ASCII whitespace, so Unicode spaces
    /// (no-break, narrow no-break, ...) are folded to `' '` first.
    pub fn parse(&self, text: &str) -> Vec<RawCitation> {
        let text = fold_whitespace(text);
        self.tag
            .captures_iter(&text)
            .filter_map(|caps| {
                Some(RawCitation {
                    doc_id: caps.get(1)?.as_str().to_string(),
                    line_list: caps.get(2)?.as_str().to_string(),
                })
            })
            .collect()
    }

    /// Positive line numbers found in a captured line list.
    ///
    /// Digit runs that are zero or do not fit in a `u32` are skipped.
    pub fn line_numbers(&self, line_list: &str) -> Vec<u32> {
        self.digits
            .find_iter(line_list)
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .filter(|&line| line > 0)
            .collect()
    }
}

fn fold_whitespace(text: &str) -> Cow<'_, str> {
    if text.chars().any(|c| c.is_whitespace() && !c.is_ascii()) {
        Cow::Owned(
            text.chars()
                .map(|c| if c.is_whitespace() && !c.is_ascii() { ' ' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(text)
    }
}
