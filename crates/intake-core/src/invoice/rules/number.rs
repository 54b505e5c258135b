//! Invoice number extraction near the invoice anchor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{
    ANCHOR_ANYWHERE, HASH_TOKEN, IDENTIFIER_TOKEN, INVOICE_HEADER_ONLY,
    INVOICE_NUMBER_SAME_LINE, INV_PREFIX, TOKEN_SEPARATOR,
};
use super::{has_digit, window_after, window_lines, ExtractionMatch, FieldExtractor};
use crate::models::invoice::Field;

/// Invoice number fallback strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceNumberStrategy {
    /// `Invoice No. 123` on the anchor line.
    SameLineLabel,
    /// Bare `Invoice #` header with the number on a following line.
    FollowingLines,
    /// First `#TOKEN` containing a digit.
    HashToken,
    /// `INV-123` style prefix; the prefix is dropped.
    InvPrefix,
    /// First identifier-like token with a digit.
    TokenScan,
}

impl InvoiceNumberStrategy {
    pub const DEFAULT_ORDER: [InvoiceNumberStrategy; 5] = [
        InvoiceNumberStrategy::SameLineLabel,
        InvoiceNumberStrategy::FollowingLines,
        InvoiceNumberStrategy::HashToken,
        InvoiceNumberStrategy::InvPrefix,
        InvoiceNumberStrategy::TokenScan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceNumberStrategy::SameLineLabel => "same_line_label",
            InvoiceNumberStrategy::FollowingLines => "following_lines",
            InvoiceNumberStrategy::HashToken => "hash_token",
            InvoiceNumberStrategy::InvPrefix => "inv_prefix",
            InvoiceNumberStrategy::TokenScan => "token_scan",
        }
    }
}

/// Invoice number extractor.
pub struct InvoiceNumberExtractor {
    window: usize,
    token_scan: usize,
    follow_lines: usize,
    order: Vec<InvoiceNumberStrategy>,
}

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self {
            window: 300,
            token_scan: 15,
            follow_lines: 2,
            order: InvoiceNumberStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    pub fn with_window(mut self, chars: usize) -> Self {
        self.window = chars;
        self
    }

    pub fn with_token_scan(mut self, tokens: usize) -> Self {
        self.token_scan = tokens;
        self
    }

    pub fn with_follow_lines(mut self, lines: usize) -> Self {
        self.follow_lines = lines;
        self
    }

    pub fn with_order(mut self, order: Vec<InvoiceNumberStrategy>) -> Self {
        self.order = order;
        self
    }

    fn apply(&self, strategy: InvoiceNumberStrategy, window: &str) -> Option<(String, String)> {
        match strategy {
            InvoiceNumberStrategy::SameLineLabel => {
                let line = window.lines().next()?;
                let caps = INVOICE_NUMBER_SAME_LINE.captures(line)?;
                let token = &caps[1];
                if has_digit(token) && !token.eq_ignore_ascii_case("invoice") {
                    Some((token.to_string(), caps[0].to_string()))
                } else {
                    None
                }
            }
            InvoiceNumberStrategy::FollowingLines => {
                let lines = window_lines(window);
                let header = lines.first()?;
                if !INVOICE_HEADER_ONLY.is_match(header) {
                    return None;
                }
                lines
                    .iter()
                    .skip(1)
                    .take(self.follow_lines)
                    .find_map(|line| {
                        TOKEN_SEPARATOR
                            .split(line)
                            .find(|t| has_digit(t))
                            .map(|t| (strip_hash(t), line.to_string()))
                    })
            }
            InvoiceNumberStrategy::HashToken => HASH_TOKEN
                .captures_iter(window)
                .find(|caps| has_digit(&caps[1]))
                .map(|caps| (caps[1].to_string(), caps[0].to_string())),
            InvoiceNumberStrategy::InvPrefix => INV_PREFIX
                .captures_iter(window)
                .find(|caps| has_digit(&caps[1]))
                .map(|caps| (caps[1].to_string(), caps[0].to_string())),
            InvoiceNumberStrategy::TokenScan => TOKEN_SEPARATOR
                .split(window)
                .filter(|t| !t.is_empty())
                .take(self.token_scan)
                .find(|t| has_digit(t) && IDENTIFIER_TOKEN.is_match(t))
                .map(|t| (strip_hash(t), t.to_string())),
        }
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_hash(token: &str) -> String {
    token.trim_start_matches('#').to_string()
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = String;

    fn field(&self) -> Field {
        Field::InvoiceNumber
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let anchor = ANCHOR_ANYWHERE.find(text)?;
        let window = window_after(text, anchor.start(), self.window);

        for strategy in &self.order {
            if let Some((value, source)) = self.apply(*strategy, window) {
                if value.is_empty() {
                    continue;
                }
                debug!("Invoice number matched by {}: {}", strategy.as_str(), value);
                return Some(ExtractionMatch::new(value, strategy.as_str(), source));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn number(text: &str) -> Option<(String, &'static str)> {
        InvoiceNumberExtractor::new()
            .extract(text)
            .map(|m| (m.value, m.strategy))
    }

    #[test]
    fn test_hash_prefixed_inv_number() {
        assert_eq!(
            number("Frontier Lumber Invoice #INV-1003 Date 01/02/2024"),
            Some(("INV-1003".to_string(), "same_line_label"))
        );
    }

    #[test]
    fn test_labelled_forms() {
        for text in [
            "Invoice No. 4471",
            "Invoice Number: 4471",
            "INVOICE: 4471",
            "invoice #: 4471",
        ] {
            assert_eq!(number(text).map(|(v, _)| v), Some("4471".to_string()), "{text}");
        }
    }

    #[test]
    fn test_number_on_following_line() {
        let text = "Acme Corp\nInvoice #\n\nA-2024-17 Net 30";
        assert_eq!(
            number(text),
            Some(("A-2024-17".to_string(), "following_lines"))
        );
    }

    #[test]
    fn test_following_lines_limit() {
        let text = "Invoice\nBill To\nJane Doe\nRef 99";
        let m = InvoiceNumberExtractor::new()
            .with_order(vec![InvoiceNumberStrategy::FollowingLines])
            .extract(text);
        assert!(m.is_none());
    }

    #[test]
    fn test_hash_token_fallback() {
        let text = "invoice details below, reference #77812 thanks";
        assert_eq!(number(text), Some(("77812".to_string(), "hash_token")));
    }

    #[test]
    fn test_inv_prefix_drops_prefix() {
        let text = "Invoice details for INV 5531";
        assert_eq!(number(text), Some(("5531".to_string(), "inv_prefix")));
    }

    #[test]
    fn test_token_scan_strips_hash() {
        let m = InvoiceNumberExtractor::new()
            .with_order(vec![InvoiceNumberStrategy::TokenScan])
            .extract("invoice for services #A17 rendered")
            .unwrap();
        assert_eq!(m.value, "A17");
    }

    #[test]
    fn test_token_scan_respects_limit() {
        let text = "invoice a b c d e 42";
        let extractor = InvoiceNumberExtractor::new()
            .with_order(vec![InvoiceNumberStrategy::TokenScan])
            .with_token_scan(3);
        assert!(extractor.extract(text).is_none());
    }

    #[test]
    fn test_no_digits_no_number() {
        assert_eq!(number("Invoice for consulting services"), None);
        assert_eq!(number("no anchor 12345"), None);
    }
}
