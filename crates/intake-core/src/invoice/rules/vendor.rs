//! Vendor name extraction from the text preceding the invoice header.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{
    ADDRESS_TAIL, ADDRESS_TOKEN, ANCHOR, COLUMN_BREAK, CONTACT_KEYWORD, STATE_ZIP,
    STATE_ZIP_TAIL, STREET_NUMBER,
};
use super::{has_digit, window_before, ExtractionMatch, FieldExtractor};
use crate::models::invoice::Field;

/// Vendor fallback strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStrategy {
    /// First segment with no digits that does not look like an address.
    NameOnlyLine,
    /// First segment with any address/contact tail cut off.
    FirstLineTrimmed,
    /// Longest segment that does not look like an address, tail cut off.
    LongestNonAddress,
}

impl VendorStrategy {
    pub const DEFAULT_ORDER: [VendorStrategy; 3] = [
        VendorStrategy::NameOnlyLine,
        VendorStrategy::FirstLineTrimmed,
        VendorStrategy::LongestNonAddress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStrategy::NameOnlyLine => "name_only_line",
            VendorStrategy::FirstLineTrimmed => "first_line_trimmed",
            VendorStrategy::LongestNonAddress => "longest_non_address",
        }
    }

    fn apply<'a>(&self, segments: &[&'a str]) -> Option<(String, &'a str)> {
        let found = match self {
            VendorStrategy::NameOnlyLine => segments
                .iter()
                .find(|s| !has_digit(s) && !looks_like_address(s))
                .copied(),
            VendorStrategy::FirstLineTrimmed => segments.first().copied(),
            VendorStrategy::LongestNonAddress => {
                let mut longest: Option<&str> = None;
                for segment in segments.iter().filter(|s| !looks_like_address(s)) {
                    let len = segment.chars().count();
                    if longest.is_none_or(|l| len > l.chars().count()) {
                        longest = Some(*segment);
                    }
                }
                longest
            }
        }?;

        let name = trim_address_tail(found);
        (!name.is_empty()).then_some((name, found))
    }
}

/// Heuristic check for postal address or contact lines.
pub fn looks_like_address(line: &str) -> bool {
    STREET_NUMBER.is_match(line)
        || ADDRESS_TOKEN.is_match(line)
        || STATE_ZIP.is_match(line)
        || CONTACT_KEYWORD.is_match(line)
}

/// Cut a trailing street address, contact detail or `, ST 12345` tail.
pub fn trim_address_tail(s: &str) -> String {
    let out = ADDRESS_TAIL.replace(s, "");
    let out = STATE_ZIP_TAIL.replace(&out, "");
    out.trim().to_string()
}

/// Vendor name extractor.
pub struct VendorExtractor {
    window: usize,
    order: Vec<VendorStrategy>,
}

impl VendorExtractor {
    pub fn new() -> Self {
        Self {
            window: 600,
            order: VendorStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    /// Set how many characters before the anchor are inspected.
    pub fn with_window(mut self, chars: usize) -> Self {
        self.window = chars;
        self
    }

    /// Replace the strategy order.
    pub fn with_order(mut self, order: Vec<VendorStrategy>) -> Self {
        self.order = order;
        self
    }

    /// Split the header window into line-like segments.
    ///
    /// Real line breaks come first; runs of two or more spaces inside a line
    /// are treated as column breaks.
    pub fn segments(window: &str) -> Vec<&str> {
        window
            .lines()
            .flat_map(|line| COLUMN_BREAK.split(line))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = String;

    fn field(&self) -> Field {
        Field::Vendor
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let anchor = ANCHOR.find(text)?;
        let header = window_before(text, anchor.start(), self.window);
        let segments = Self::segments(header);

        for strategy in &self.order {
            if let Some((name, segment)) = strategy.apply(&segments) {
                debug!("Vendor matched by {}: {:?}", strategy.as_str(), name);
                return Some(ExtractionMatch::new(name, strategy.as_str(), segment));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vendor(text: &str) -> String {
        VendorExtractor::new()
            .extract(text)
            .map(|m| m.value)
            .unwrap_or_default()
    }

    #[test]
    fn test_no_anchor_yields_empty() {
        assert_eq!(vendor("Acme Supply Co 12 Main St Total $10.00"), "");
        assert_eq!(vendor(""), "");
    }

    #[test]
    fn test_anchor_at_start_yields_empty() {
        assert_eq!(vendor("Invoice #42 from Acme"), "");
    }

    #[test]
    fn test_prefers_digit_free_name_line() {
        let text = "Frontier Lumber Co\n1200 Main St\nCheyenne, WY 82001\nINVOICE\n#1003";
        let m = VendorExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "Frontier Lumber Co");
        assert_eq!(m.strategy, "name_only_line");
    }

    #[test]
    fn test_column_breaks_split_segments() {
        let text = "Blue Ridge Electric  Phone 555-0100  Invoice Date 01/02/2024";
        assert_eq!(vendor(text), "Blue Ridge Electric");
    }

    #[test]
    fn test_single_line_trims_address_tail() {
        let text = "Frontier Lumber Co 1200 Main St Cheyenne, WY 82001 Invoice #1003";
        let m = VendorExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "Frontier Lumber Co");
        assert_eq!(m.strategy, "first_line_trimmed");
    }

    #[test]
    fn test_trims_contact_tail() {
        assert_eq!(trim_address_tail("Acme Corp Phone 555-1234"), "Acme Corp");
        assert_eq!(trim_address_tail("Acme Corp, WY 82001"), "Acme Corp");
        assert_eq!(trim_address_tail("Acme Corp"), "Acme Corp");
    }

    #[test]
    fn test_address_detection() {
        assert!(looks_like_address("1200 Main St"));
        assert!(looks_like_address("Suite B"));
        assert!(looks_like_address("Cheyenne WY 82001"));
        assert!(looks_like_address("email billing@acme.test"));
        assert!(!looks_like_address("Frontier Lumber Co"));
    }

    #[test]
    fn test_longest_non_address_fallback() {
        let order = vec![VendorStrategy::LongestNonAddress];
        let text = "ACME\nAcme Industrial Supply\nSuite 4\ninvoice 7";
        let m = VendorExtractor::new()
            .with_order(order)
            .extract(text)
            .unwrap();
        assert_eq!(m.value, "Acme Industrial Supply");
        assert_eq!(m.strategy, "longest_non_address");
    }

    #[test]
    fn test_window_bounds_header() {
        let text = format!("Old Vendor Name {}New Vendor invoice", "x".repeat(50) + "  ");
        let m = VendorExtractor::new().with_window(12).extract(&text).unwrap();
        assert_eq!(m.value, "New Vendor");
    }
}
