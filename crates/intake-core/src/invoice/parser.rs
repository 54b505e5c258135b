//! Heuristic invoice parser combining the rule-based field extractors.

use serde::Serialize;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{FieldTrace, ParsedInvoice};

use super::normalize::{normalize, NormalizeMode};
use super::rules::amounts::currency_code;
use super::rules::{
    AmountExtractor, DateExtractor, ExtractionMatch, FieldExtractor, InvoiceNumberExtractor,
    LineItemExtractor, PurchaseOrderExtractor, VendorExtractor,
};
use super::RULESET_VERSION;

/// Parsed record plus details of how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Extracted invoice data.
    pub invoice: ParsedInvoice,
    /// Text the extractors ran on.
    pub normalized_text: String,
    /// Invoice date token before canonicalization.
    pub raw_invoice_date: String,
    /// Due date token before canonicalization.
    pub raw_due_date: String,
    /// Strategy that filled each field.
    pub trace: Vec<FieldTrace>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Ruleset used for this record.
    pub ruleset_version: String,
}

/// Trait for invoice parsing.
///
/// Parsing never fails: fields no heuristic matched are left empty.
pub trait InvoiceParser {
    /// Parse raw text into a record.
    fn parse(&self, text: &str) -> ParsedInvoice {
        self.parse_with_report(text).invoice
    }

    /// Parse raw text and keep the normalized text, raw tokens and trace.
    fn parse_with_report(&self, text: &str) -> ExtractionReport;
}

/// Parser running every field extractor over normalized text.
pub struct HeuristicInvoiceParser {
    normalize_mode: NormalizeMode,
    vendor: VendorExtractor,
    invoice_number: InvoiceNumberExtractor,
    invoice_date: DateExtractor,
    due_date: DateExtractor,
    amount: AmountExtractor,
    po_number: PurchaseOrderExtractor,
    line_items: LineItemExtractor,
}

impl HeuristicInvoiceParser {
    /// Create a parser with the default ruleset.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            normalize_mode: config.normalize_mode,
            vendor: VendorExtractor::new()
                .with_window(config.vendor_window)
                .with_order(config.vendor_order.clone()),
            invoice_number: InvoiceNumberExtractor::new()
                .with_window(config.invoice_number_window)
                .with_token_scan(config.invoice_number_token_scan)
                .with_follow_lines(config.follow_lines)
                .with_order(config.invoice_number_order.clone()),
            invoice_date: DateExtractor::invoice_date()
                .with_window(config.date_window)
                .with_follow_lines(config.follow_lines),
            due_date: DateExtractor::due_date()
                .with_window(config.date_window)
                .with_follow_lines(config.follow_lines),
            amount: AmountExtractor::new().with_order(config.amount_order.clone()),
            po_number: PurchaseOrderExtractor::new(),
            line_items: LineItemExtractor::new().with_cap(config.line_item_cap),
        }
    }

    /// Set the maximum number of line items.
    pub fn with_line_item_cap(mut self, cap: usize) -> Self {
        self.line_items = LineItemExtractor::new().with_cap(cap);
        self
    }

    /// Set how raw text is normalized.
    pub fn with_normalize_mode(mut self, mode: NormalizeMode) -> Self {
        self.normalize_mode = mode;
        self
    }
}

impl Default for HeuristicInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one extractor and record which strategy answered.
fn run<E: FieldExtractor>(
    extractor: &E,
    text: &str,
    trace: &mut Vec<FieldTrace>,
) -> Option<ExtractionMatch<E::Output>> {
    let found = extractor.extract(text);
    trace.push(FieldTrace {
        field: extractor.field(),
        strategy: found.as_ref().map(|m| m.strategy.to_string()),
        source: found.as_ref().map(|m| m.source.clone()),
        position: found.as_ref().and_then(|m| m.position),
    });
    found
}

impl InvoiceParser for HeuristicInvoiceParser {
    fn parse_with_report(&self, text: &str) -> ExtractionReport {
        let text = normalize(text, self.normalize_mode);
        info!("Parsing invoice from {} characters of text", text.len());

        let mut trace = Vec::new();
        let mut warnings = Vec::new();

        let vendor = run(&self.vendor, &text, &mut trace);
        let invoice_number = run(&self.invoice_number, &text, &mut trace);
        let invoice_date = run(&self.invoice_date, &text, &mut trace);
        let due_date = run(&self.due_date, &text, &mut trace);
        let amount_due = run(&self.amount, &text, &mut trace);
        let po_number = run(&self.po_number, &text, &mut trace);
        let line_items = run(&self.line_items, &text, &mut trace);

        // Date matches carry the raw token as their source.
        let raw_invoice_date = invoice_date
            .as_ref()
            .map(|m| m.source.clone())
            .unwrap_or_default();
        let raw_due_date = due_date
            .as_ref()
            .map(|m| m.source.clone())
            .unwrap_or_default();

        let amount_due = amount_due.map(|m| m.value).unwrap_or_default();
        let invoice = ParsedInvoice {
            vendor: vendor.map(|m| m.value).unwrap_or_default(),
            invoice_number: invoice_number.map(|m| m.value).unwrap_or_default(),
            invoice_date: invoice_date.map(|m| m.value).unwrap_or_default(),
            due_date: due_date.map(|m| m.value).unwrap_or_default(),
            currency: currency_code(&amount_due).to_string(),
            amount_due,
            po_number: po_number.map(|m| m.value).unwrap_or_default(),
            line_items: line_items.map(|m| m.value).unwrap_or_default(),
        };

        if invoice.invoice_date.is_empty() && !raw_invoice_date.is_empty() {
            warnings.push(format!("Unrecognized invoice date: {}", raw_invoice_date));
        }
        if invoice.due_date.is_empty() && !raw_due_date.is_empty() {
            warnings.push(format!("Unrecognized due date: {}", raw_due_date));
        }
        for field in invoice.missing_fields() {
            warnings.push(format!("Could not extract {}", field.as_str().replace('_', " ")));
        }

        debug!(
            "Extracted {} of {} fields",
            trace.iter().filter(|t| t.matched()).count(),
            trace.len()
        );

        ExtractionReport {
            invoice,
            normalized_text: text,
            raw_invoice_date,
            raw_due_date,
            trace,
            warnings,
            ruleset_version: RULESET_VERSION.to_string(),
        }
    }
}
