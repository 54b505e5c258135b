//! Purchase order reference extraction.

use super::patterns::PO_NUMBER;
use super::{has_digit, ExtractionMatch, FieldExtractor};
use crate::models::invoice::Field;

/// Extracts the token following a `PO`, `PO #` or `PO Number` label.
pub struct PurchaseOrderExtractor;

impl PurchaseOrderExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PurchaseOrderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PurchaseOrderExtractor {
    type Output = String;

    fn field(&self) -> Field {
        Field::PoNumber
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        PO_NUMBER
            .captures_iter(text)
            .find(|caps| has_digit(&caps[1]))
            .and_then(|caps| {
                let token = caps.get(1)?;
                Some(
                    ExtractionMatch::new(token.as_str().to_string(), "po_label", &caps[0])
                        .with_position(token.start(), token.end()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn po(text: &str) -> Option<String> {
        PurchaseOrderExtractor::new().extract(text).map(|m| m.value)
    }

    #[test]
    fn test_po_labels() {
        assert_eq!(po("PO: 4500123"), Some("4500123".to_string()));
        assert_eq!(po("Ref PO # A-7781 Net 30"), Some("A-7781".to_string()));
        assert_eq!(po("po number 2024/55"), Some("2024/55".to_string()));
    }

    #[test]
    fn test_po_requires_digit() {
        assert_eq!(po("PO Box ABC"), None);
        assert_eq!(po("Deposit paid"), None);
    }

    #[test]
    fn test_skips_digitless_candidate() {
        assert_eq!(po("PO pending, PO 88123"), Some("88123".to_string()));
    }
}
