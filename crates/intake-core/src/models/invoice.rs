//! Parsed invoice record produced by the extraction engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Best-guess structured fields recovered from invoice text.
///
/// Every field is independently optional. A field that no heuristic matched
/// is an empty string (or an empty list), never a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedInvoice {
    /// Organization name taken from the text preceding the invoice header.
    pub vendor: String,

    /// Invoice identifier; contains at least one digit when present.
    pub invoice_number: String,

    /// Invoice date as `YYYY-MM-DD`.
    pub invoice_date: String,

    /// Payment due date as `YYYY-MM-DD`.
    pub due_date: String,

    /// Amount due exactly as matched in the text (e.g. `$1,234.56`).
    pub amount_due: String,

    /// Purchase-order reference.
    pub po_number: String,

    /// ISO currency code guessed from the amount symbol.
    pub currency: String,

    /// Line items in order of appearance.
    #[serde(rename = "items")]
    pub line_items: Vec<LineItem>,
}

/// A single line item recognized in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description with quantity and price tokens removed.
    pub description: String,

    /// Quantity (1-3 digits in the source text).
    pub quantity: u32,

    /// Unit price as matched (e.g. `$45.00`).
    pub unit_price: String,
}

/// Fields produced by the extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Vendor,
    InvoiceNumber,
    InvoiceDate,
    DueDate,
    AmountDue,
    PoNumber,
    LineItems,
}

impl Field {
    /// All fields in record order.
    pub const ALL: [Field; 7] = [
        Field::Vendor,
        Field::InvoiceNumber,
        Field::InvoiceDate,
        Field::DueDate,
        Field::AmountDue,
        Field::PoNumber,
        Field::LineItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Vendor => "vendor",
            Field::InvoiceNumber => "invoice_number",
            Field::InvoiceDate => "invoice_date",
            Field::DueDate => "due_date",
            Field::AmountDue => "amount_due",
            Field::PoNumber => "po_number",
            Field::LineItems => "items",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy filled a field, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTrace {
    pub field: Field,

    /// Name of the matching strategy; `None` when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    /// Text the strategy matched, before any canonicalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Byte range of the value in the normalized text, when the strategy
    /// pinpoints it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<(usize, usize)>,
}

impl FieldTrace {
    pub fn matched(&self) -> bool {
        self.strategy.is_some()
    }
}

impl ParsedInvoice {
    /// Check whether a single field holds a value.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Vendor => !self.vendor.is_empty(),
            Field::InvoiceNumber => !self.invoice_number.is_empty(),
            Field::InvoiceDate => !self.invoice_date.is_empty(),
            Field::DueDate => !self.due_date.is_empty(),
            Field::AmountDue => !self.amount_due.is_empty(),
            Field::PoNumber => !self.po_number.is_empty(),
            Field::LineItems => !self.line_items.is_empty(),
        }
    }

    /// Fields left empty by extraction.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }

    /// True when no field was recognized.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| !self.has(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_record_is_empty() {
        let invoice = ParsedInvoice::default();
        assert!(invoice.is_empty());
        assert_eq!(invoice.missing_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn test_serializes_empty_fields_as_empty_strings() {
        let json = serde_json::to_value(ParsedInvoice::default()).unwrap();
        assert_eq!(json["vendor"], "");
        assert_eq!(json["invoice_number"], "");
        assert_eq!(json["items"], serde_json::json!([]));
    }

    #[test]
    fn test_missing_fields_skips_filled() {
        let invoice = ParsedInvoice {
            vendor: "Acme Supply Co".to_string(),
            amount_due: "$10.00".to_string(),
            ..Default::default()
        };
        let missing = invoice.missing_fields();
        assert!(!missing.contains(&Field::Vendor));
        assert!(!missing.contains(&Field::AmountDue));
        assert!(missing.contains(&Field::DueDate));
    }
}
