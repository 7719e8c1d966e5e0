// SPDX-License-Identifier: Apache-2.0

use regex::Regex;
use std::sync::OnceLock;

/// One candidate spare-part token found in a text, with its byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'t> {
    pub text: &'t str,
    pub start: usize,
}

impl TokenMatch<'_> {
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

fn spare_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b\w+_spare\b").expect("spare token pattern compiles")
    })
}

/// Scans a text for word-boundary-delimited `<name>_spare` tokens,
/// case-insensitively, left to right and non-overlapping.
///
/// Pure candidate detection: whether a token is a real catalog ID is the
/// resolver's call, not the matcher's.
#[must_use]
pub fn find_spare_tokens(text: &str) -> Vec<TokenMatch<'_>> {
    spare_pattern()
        .find_iter(text)
        .map(|m| TokenMatch {
            text: m.as_str(),
            start: m.start(),
        })
        .collect()
}
