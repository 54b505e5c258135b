//! Output formatting shared by the parse and batch commands.

use intake_core::{InvoiceForm, ParsedInvoice};

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON record
    Json,
    /// CSV with one header row and one data row
    Csv,
    /// Plain text summary
    Text,
    /// JSON form values (amounts with two decimals, first lines only)
    Form,
}

impl OutputFormat {
    /// File extension used when writing one output per input.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Form => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Render a record in the requested format.
pub fn format_invoice(
    invoice: &ParsedInvoice,
    format: OutputFormat,
    form_lines: usize,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
        OutputFormat::Form => {
            let form = InvoiceForm::from_parsed_with_limit(invoice, form_lines);
            Ok(serde_json::to_string_pretty(&form)?)
        }
    }
}

fn format_csv(invoice: &ParsedInvoice) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "vendor",
        "invoice_number",
        "invoice_date",
        "due_date",
        "amount_due",
        "currency",
        "po_number",
        "line_items",
    ])?;

    let line_items = invoice.line_items.len().to_string();
    wtr.write_record([
        invoice.vendor.as_str(),
        invoice.invoice_number.as_str(),
        invoice.invoice_date.as_str(),
        invoice.due_date.as_str(),
        invoice.amount_due.as_str(),
        invoice.currency.as_str(),
        invoice.po_number.as_str(),
        line_items.as_str(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &ParsedInvoice) -> String {
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    let mut output = String::new();

    output.push_str(&format!("Vendor:     {}\n", or_dash(&invoice.vendor)));
    output.push_str(&format!("Invoice:    {}\n", or_dash(&invoice.invoice_number)));
    output.push_str(&format!("Date:       {}\n", or_dash(&invoice.invoice_date)));
    output.push_str(&format!("Due:        {}\n", or_dash(&invoice.due_date)));
    output.push_str(&format!("Amount due: {}", or_dash(&invoice.amount_due)));
    if !invoice.currency.is_empty() {
        output.push_str(&format!(" ({})", invoice.currency));
    }
    output.push('\n');
    if !invoice.po_number.is_empty() {
        output.push_str(&format!("PO:         {}\n", invoice.po_number));
    }

    if !invoice.line_items.is_empty() {
        output.push_str("\nLine items:\n");
        for item in &invoice.line_items {
            output.push_str(&format!(
                "  {} x {} @ {}\n",
                item.quantity, item.description, item.unit_price
            ));
        }
    }

    let missing = invoice.missing_fields();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
        output.push_str(&format!("\nMissing: {}\n", names.join(", ")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::LineItem;

    fn invoice() -> ParsedInvoice {
        ParsedInvoice {
            vendor: "Frontier Lumber Co".to_string(),
            invoice_number: "INV-1003".to_string(),
            invoice_date: "2024-03-14".to_string(),
            amount_due: "$1,072.50".to_string(),
            currency: "USD".to_string(),
            line_items: vec![LineItem {
                description: "Cedar Planks".to_string(),
                quantity: 3,
                unit_price: "$45.00".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let csv = format_invoice(&invoice(), OutputFormat::Csv, 3).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("vendor,invoice_number"));
        assert!(lines[1].contains("\"$1,072.50\""));
        assert!(lines[1].ends_with(",1"));
    }

    #[test]
    fn test_text_lists_missing_fields() {
        let text = format_invoice(&invoice(), OutputFormat::Text, 3).unwrap();
        assert!(text.contains("Amount due: $1,072.50 (USD)"));
        assert!(text.contains("3 x Cedar Planks @ $45.00"));
        assert!(text.contains("Missing: due_date"));
    }

    #[test]
    fn test_form_uses_two_decimals() {
        let form = format_invoice(&invoice(), OutputFormat::Form, 3).unwrap();
        assert!(form.contains("\"1072.50\""));
        assert!(form.contains("\"135.00\""));
    }
}
