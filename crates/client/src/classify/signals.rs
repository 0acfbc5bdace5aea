//! Textual signals found on search results pages.

use serde::Serialize;

/// "No results" phrases, Japanese and English result page variants.
pub const NOT_INDEXED_SIGNALS: &[&str] = &[
    "に一致する情報は見つかりませんでした",
    "に一致する検索結果はありません",
    "Your search did not match any documents",
    "did not match any search results",
    "検索条件に一致するページは見つかりませんでした",
];

/// Markup fragments that only appear in a populated result list.
pub const INDEXED_SIGNALS: &[&str] = &[
    r#"class="LC20lb""#, // result title
    r#"class="VwiC3b""#, // result snippet
    r#"class="yuRUbf""#, // result container
    "data-hveid",
];

/// What a scan of one page found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalReport {
    /// First "no results" phrase present, if any.
    pub not_indexed_signal: Option<&'static str>,
    /// Every result-list fragment present, in declaration order.
    pub indexed_signals: Vec<&'static str>,
}

impl SignalReport {
    /// A page counts as indexed only when it shows result markup and no
    /// "no results" phrase. A "no results" phrase always wins.
    pub fn is_indexed(&self) -> bool {
        self.not_indexed_signal.is_none() && !self.indexed_signals.is_empty()
    }
}

/// Scan page text for both signal sets.
pub fn scan_signals(text: &str) -> SignalReport {
    SignalReport {
        not_indexed_signal: NOT_INDEXED_SIGNALS.iter().copied().find(|s| text.contains(s)),
        indexed_signals: INDEXED_SIGNALS.iter().copied().filter(|s| text.contains(s)).collect(),
    }
}
