//! Rule-based field extractors for invoice text.
//!
//! Each extractor runs an ordered list of strategies and stops at the first
//! one that produces a value. The default orders form the ruleset identified
//! by [`RULESET_VERSION`](crate::invoice::RULESET_VERSION).

pub mod amounts;
pub mod dates;
pub mod line_items;
pub mod number;
pub mod patterns;
pub mod purchase_order;
pub mod vendor;

pub use amounts::{amount_value, AmountExtractor, AmountStrategy};
pub use dates::{to_input_date, DateExtractor, DUE_DATE_LABELS, INVOICE_DATE_LABELS};
pub use line_items::{split_chunks, LineItemExtractor};
pub use number::{InvoiceNumberExtractor, InvoiceNumberStrategy};
pub use purchase_order::PurchaseOrderExtractor;
pub use vendor::{looks_like_address, trim_address_tail, VendorExtractor, VendorStrategy};

use crate::models::invoice::Field;

/// Trait for field extractors.
///
/// `Some` means a strategy matched; `None` means the field stays empty.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// The record field this extractor fills.
    fn field(&self) -> Field;

    /// Extract the field from normalized text.
    fn extract(&self, text: &str) -> Option<ExtractionMatch<Self::Output>>;
}

/// A value found by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the strategy that matched.
    pub strategy: &'static str,
    /// Source text that was matched.
    pub source: String,
    /// Byte offsets of the match in the extractor input.
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, strategy: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            strategy,
            source: source.into(),
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Up to `max_chars` characters ending at byte offset `end`.
pub(crate) fn window_before(text: &str, end: usize, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .nth(max_chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &head[start..]
}

/// Up to `max_chars` characters starting at byte offset `start`.
pub(crate) fn window_after(text: &str, start: usize, max_chars: usize) -> &str {
    let tail = &text[start..];
    let end = tail
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}

/// Trimmed, non-empty lines of a window.
pub(crate) fn window_lines(window: &str) -> Vec<&str> {
    window
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

pub(crate) fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_before_counts_chars() {
        let text = "Zürich AG invoice";
        let end = text.find("invoice").unwrap();
        assert_eq!(window_before(text, end, 3), "AG ");
        assert_eq!(window_before(text, end, 100), "Zürich AG ");
        assert_eq!(window_before(text, end, 0), "");
    }

    #[test]
    fn test_window_after_counts_chars() {
        let text = "invoice № 42";
        assert_eq!(window_after(text, 0, 9), "invoice №");
        assert_eq!(window_after(text, 0, 100), text);
    }

    #[test]
    fn test_window_lines_drops_blanks() {
        assert_eq!(window_lines("a\n\n  b  \r\n"), vec!["a", "b"]);
    }
}
