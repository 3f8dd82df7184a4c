//! Text folding for free-text search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold `text` for case- and diacritic-insensitive comparison: compatibility
/// decomposition, combining marks dropped, lowercased, outer whitespace
/// trimmed.
pub fn fold(text: &str) -> String {
    text.trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// A folded search needle, matched by substring against folded haystacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Needle(String);

impl Needle {
    /// `None` for blank input.
    pub fn new(text: &str) -> Option<Self> {
        let folded = fold(text);
        (!folded.is_empty()).then_some(Self(folded))
    }

    pub fn matches(&self, haystack: &str) -> bool {
        fold(haystack).contains(&self.0)
    }
}
