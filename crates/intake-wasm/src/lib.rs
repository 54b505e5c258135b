//! WASM bindings for invoice intake.
//!
//! Text acquisition happens in the host (PDF.js, browser OCR); these bindings
//! run the extraction engine on the resulting text.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use intake_core::invoice::rules::to_input_date as canonical_date;
use intake_core::{
    normalize, ExtractionConfig, HeuristicInvoiceParser, InvoiceForm, InvoiceParser,
    NormalizeMode, RULESET_VERSION,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Version of the extraction ruleset.
#[wasm_bindgen]
pub fn ruleset_version() -> String {
    RULESET_VERSION.to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract an invoice record from text with the default ruleset.
#[wasm_bindgen]
pub fn parse_invoice_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&HeuristicInvoiceParser::new().parse(text))
}

/// Normalize raw text the way the extractors see it.
#[wasm_bindgen]
pub fn normalize_text(text: &str, keep_lines: bool) -> String {
    normalize(text, mode(keep_lines))
}

/// Canonicalize a date token to `YYYY-MM-DD`, or an empty string.
#[wasm_bindgen]
pub fn to_input_date(raw: &str) -> String {
    canonical_date(raw)
}

/// Extract a record and map it onto form values.
#[wasm_bindgen]
pub fn form_values(text: &str) -> Result<JsValue, JsValue> {
    let invoice = HeuristicInvoiceParser::new().parse(text);
    to_js(&InvoiceForm::from_parsed(&invoice))
}

fn mode(keep_lines: bool) -> NormalizeMode {
    if keep_lines {
        NormalizeMode::KeepLines
    } else {
        NormalizeMode::SingleLine
    }
}

/// Invoice extractor class for browser use.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    config: ExtractionConfig,
    parser: HeuristicInvoiceParser,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create a new invoice extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let config = ExtractionConfig::default();
        let parser = HeuristicInvoiceParser::from_config(&config);
        Self { config, parser }
    }

    /// Create an extractor from a JSON extraction configuration.
    #[wasm_bindgen]
    pub fn from_config_json(json: &str) -> Result<InvoiceExtractor, JsValue> {
        let config: ExtractionConfig =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let parser = HeuristicInvoiceParser::from_config(&config);
        Ok(Self { config, parser })
    }

    /// Limit the number of line items returned.
    #[wasm_bindgen]
    pub fn set_line_item_cap(&mut self, cap: usize) {
        self.config.line_item_cap = cap;
        self.rebuild();
    }

    /// Keep line breaks during normalization.
    #[wasm_bindgen]
    pub fn set_keep_lines(&mut self, keep_lines: bool) {
        self.config.normalize_mode = mode(keep_lines);
        self.rebuild();
    }

    /// Extract invoice from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(text))
    }

    /// Extract invoice together with normalized text, strategy trace and warnings.
    #[wasm_bindgen]
    pub fn extract_with_report(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse_with_report(text))
    }

    /// Extract invoice and map it onto form values.
    #[wasm_bindgen]
    pub fn extract_form(&self, text: &str) -> Result<JsValue, JsValue> {
        let invoice = self.parser.parse(text);
        to_js(&InvoiceForm::from_parsed_with_limit(
            &invoice,
            self.config.form_line_limit,
        ))
    }

    fn rebuild(&mut self) {
        self.parser = HeuristicInvoiceParser::from_config(&self.config);
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Text recognized by browser-side OCR, collected line by line.
#[wasm_bindgen]
pub struct OcrText {
    lines: Vec<String>,
}

#[wasm_bindgen]
impl OcrText {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append one recognized line in reading order.
    #[wasm_bindgen]
    pub fn add_line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    /// Get the full text.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Extract invoice from the collected text.
    #[wasm_bindgen]
    pub fn extract_invoice(&self) -> Result<JsValue, JsValue> {
        parse_invoice_text(&self.get_text())
    }
}

impl Default for OcrText {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_to_input_date() {
        assert_eq!(to_input_date("03/14/2024"), "2024-03-14");
        assert_eq!(to_input_date("2024-02-30"), "2024-02-30");
        assert_eq!(to_input_date("13/45/2024"), "");
    }

    #[wasm_bindgen_test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Acme\u{00a0} Co\n\nTotal", false), "Acme Co Total");
        assert_eq!(ruleset_version(), RULESET_VERSION);
    }

    #[wasm_bindgen_test]
    fn test_ocr_text_joins_lines() {
        let mut ocr = OcrText::new();
        ocr.add_line("Acme Supply Co");
        ocr.add_line("Invoice #1001");
        assert_eq!(ocr.get_text(), "Acme Supply Co\nInvoice #1001");
    }

    #[wasm_bindgen_test]
    fn test_extractor_cap() {
        let mut extractor = InvoiceExtractor::new();
        extractor.set_line_item_cap(1);
        assert_eq!(extractor.config.line_item_cap, 1);
        assert!(extractor.extract("Acme\nInvoice #7\nTotal $5.00").is_ok());
    }
}
