//! Configuration structures for acquisition and extraction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IntakeError, Result};
use crate::invoice::rules::{AmountStrategy, InvoiceNumberStrategy, VendorStrategy};
use crate::invoice::NormalizeMode;

/// Main configuration for the intake pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Text acquisition configuration.
    pub acquisition: AcquisitionConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Minimum normalized embedded-text length before falling back to OCR.
    pub min_text_length: usize,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,

    /// Read embedded text before trying OCR.
    pub prefer_embedded_text: bool,

    /// OCR model configuration.
    pub ocr: OcrModelConfig,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 30,
            max_pages: 0,
            prefer_embedded_text: true,
            ocr: OcrModelConfig::default(),
        }
    }
}

/// OCR model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrModelConfig {
    /// Directory containing model files; OCR stays disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_dir: Option<PathBuf>,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` markers in recognized text.
    pub keep_unknown: bool,
}

impl Default for OcrModelConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unknown: false,
        }
    }
}

impl OcrModelConfig {
    /// Full path to a model file, if a model directory is configured.
    pub fn model_path(&self, file_name: &str) -> Option<PathBuf> {
        self.model_dir.as_ref().map(|dir| dir.join(file_name))
    }
}

/// Field extraction configuration.
///
/// Window sizes are counted in characters. The strategy orders are the
/// fallback policy for each field; the defaults are ruleset
/// [`RULESET_VERSION`](crate::invoice::RULESET_VERSION).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How raw text is normalized before extraction.
    pub normalize_mode: NormalizeMode,

    /// Characters before the anchor searched for the vendor name.
    pub vendor_window: usize,

    /// Characters after the anchor searched for the invoice number.
    pub invoice_number_window: usize,

    /// Tokens after the anchor inspected by the last-resort number scan.
    pub invoice_number_token_scan: usize,

    /// Characters after a date label searched for a date.
    pub date_window: usize,

    /// Lines after a label line searched for a value.
    pub follow_lines: usize,

    /// Maximum line items returned.
    pub line_item_cap: usize,

    /// Maximum line items mapped onto the form.
    pub form_line_limit: usize,

    /// Vendor strategy order.
    pub vendor_order: Vec<VendorStrategy>,

    /// Invoice-number strategy order.
    pub invoice_number_order: Vec<InvoiceNumberStrategy>,

    /// Amount strategy order.
    pub amount_order: Vec<AmountStrategy>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            normalize_mode: NormalizeMode::default(),
            vendor_window: 600,
            invoice_number_window: 300,
            invoice_number_token_scan: 15,
            date_window: 220,
            follow_lines: 2,
            line_item_cap: 5,
            form_line_limit: 3,
            vendor_order: VendorStrategy::DEFAULT_ORDER.to_vec(),
            invoice_number_order: InvoiceNumberStrategy::DEFAULT_ORDER.to_vec(),
            amount_order: AmountStrategy::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl IntakeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| IntakeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| IntakeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
