//! Mapping of a parsed record onto editable form values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::rules::amount_value;
use crate::models::invoice::ParsedInvoice;

/// Line items shown on the form by default.
pub const DEFAULT_FORM_LINES: usize = 3;

/// Values used to pre-fill the invoice entry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceForm {
    pub vendor: String,
    pub invoice_number: String,
    /// `YYYY-MM-DD` or empty.
    pub invoice_date: String,
    /// `YYYY-MM-DD` or empty.
    pub due_date: String,
    /// Amount due with two decimal places; `0.00` when unknown.
    pub amount: Decimal,
    pub currency: String,
    pub lines: Vec<FormLine>,
}

/// One editable line of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLine {
    pub description: String,
    /// At least 1.
    pub quantity: u32,
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub line_total: Decimal,
}

impl InvoiceForm {
    /// Map a record using the default line limit.
    pub fn from_parsed(invoice: &ParsedInvoice) -> Self {
        Self::from_parsed_with_limit(invoice, DEFAULT_FORM_LINES)
    }

    /// Map a record, keeping at most `line_limit` line items.
    pub fn from_parsed_with_limit(invoice: &ParsedInvoice, line_limit: usize) -> Self {
        let lines = invoice
            .line_items
            .iter()
            .take(line_limit)
            .map(|item| {
                let quantity = item.quantity.max(1);
                let unit_price = money(&item.unit_price);
                FormLine {
                    description: item.description.clone(),
                    quantity,
                    unit_price,
                    line_total: two_places(unit_price * Decimal::from(quantity)),
                }
            })
            .collect();

        Self {
            vendor: invoice.vendor.clone(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date.clone(),
            due_date: invoice.due_date.clone(),
            amount: money(&invoice.amount_due),
            currency: invoice.currency.clone(),
            lines,
        }
    }

    /// Sum of all line totals.
    pub fn lines_total(&self) -> Decimal {
        two_places(self.lines.iter().map(|l| l.line_total).sum())
    }
}

fn money(s: &str) -> Decimal {
    two_places(amount_value(s))
}

fn two_places(value: Decimal) -> Decimal {
    let mut value = value.round_dp(2);
    value.rescale(2);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::LineItem;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(description: &str, quantity: u32, unit_price: &str) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price: unit_price.to_string(),
        }
    }

    #[test]
    fn test_form_from_parsed() {
        let invoice = ParsedInvoice {
            vendor: "Frontier Lumber Co".to_string(),
            invoice_number: "INV-1003".to_string(),
            invoice_date: "2024-03-14".to_string(),
            amount_due: "$1,072.50".to_string(),
            currency: "USD".to_string(),
            line_items: vec![
                line("Cedar Planks", 3, "$45.00"),
                line("Deck Screws", 2, "$12.50"),
                line("Installation", 1, "$900.00"),
                line("Haul away", 1, "$25.00"),
            ],
            ..Default::default()
        };

        let form = InvoiceForm::from_parsed(&invoice);
        assert_eq!(form.amount.to_string(), "1072.50");
        assert_eq!(form.due_date, "");
        assert_eq!(form.lines.len(), 3);
        assert_eq!(form.lines[0].line_total, dec("135.00"));
        assert_eq!(form.lines[1].unit_price.to_string(), "12.50");
        assert_eq!(form.lines_total(), dec("1060.00"));
    }

    #[test]
    fn test_missing_amount_is_zero() {
        let form = InvoiceForm::from_parsed(&ParsedInvoice::default());
        assert_eq!(form.amount.to_string(), "0.00");
        assert!(form.lines.is_empty());
        assert_eq!(form.lines_total().to_string(), "0.00");
    }

    #[test]
    fn test_zero_quantity_becomes_one() {
        let invoice = ParsedInvoice {
            line_items: vec![line("Service call", 0, "80.00")],
            ..Default::default()
        };
        let form = InvoiceForm::from_parsed_with_limit(&invoice, 5);
        assert_eq!(form.lines[0].quantity, 1);
        assert_eq!(form.lines[0].line_total, dec("80.00"));
    }
}
