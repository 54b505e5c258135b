//! Core library for invoice intake.
//!
//! This crate provides:
//! - Text acquisition from PDF invoices (embedded text, OCR fallback)
//! - A text normalizer that repairs common OCR splits
//! - Heuristic field extraction (vendor, invoice number, dates, amount, line items)
//! - Mapping of parsed records onto editable form values

pub mod error;
pub mod form;
pub mod invoice;
pub mod models;

#[cfg(feature = "native")]
pub mod acquire;
#[cfg(feature = "native")]
pub mod ocr;
#[cfg(feature = "native")]
pub mod pdf;

pub use error::{IntakeError, OcrError, PdfError, Result};
pub use form::{FormLine, InvoiceForm};
pub use invoice::{
    normalize, ExtractionReport, HeuristicInvoiceParser, InvoiceParser, NormalizeMode,
    RULESET_VERSION,
};
pub use models::config::{AcquisitionConfig, ExtractionConfig, IntakeConfig, OcrModelConfig};
pub use models::invoice::{Field, FieldTrace, LineItem, ParsedInvoice};

#[cfg(feature = "native")]
pub use acquire::{AcquiredText, TextAcquirer, TextSource};
#[cfg(feature = "native")]
pub use ocr::{OcrBackend, OcrHandle};
#[cfg(feature = "native")]
pub use pdf::{PdfExtractor, PdfProcessor};
#[cfg(feature = "onnx")]
pub use ocr::OnnxOcr;
