//! Common regex patterns for invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anchor keyword
    pub static ref ANCHOR: Regex = Regex::new(r"(?i)invoice\b").unwrap();

    pub static ref ANCHOR_ANYWHERE: Regex = Regex::new(r"(?i)invoice").unwrap();

    // Vendor segmentation and address/contact detection
    pub static ref COLUMN_BREAK: Regex = Regex::new(r" {2,}").unwrap();

    pub static ref STREET_NUMBER: Regex = Regex::new(r"\d{1,6}\s+\w+").unwrap();

    pub static ref ADDRESS_TOKEN: Regex = Regex::new(
        r"(?i)\b(?:st|ave|rd|blvd|dr|ln|ct|ter|pkwy|wy|hwy|pl|cir|way|suite|ste|unit|apt|bldg|floor|fl|po box|p\.?o\.?\s?box)\b"
    ).unwrap();

    pub static ref STATE_ZIP: Regex = Regex::new(r"\b[A-Z]{2}\s*\d{5}(?:-\d{4})?\b").unwrap();

    pub static ref CONTACT_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:phone|tel|fax|email|www\.|website|vat|tax\s*id|ein)\b"
    ).unwrap();

    pub static ref ADDRESS_TAIL: Regex = Regex::new(
        r"(?i)\s+(?:\d{1,6}\s+\w+|phone|tel|fax|email|www\.|website|vat|tax\s*id|ein).*$"
    ).unwrap();

    pub static ref STATE_ZIP_TAIL: Regex = Regex::new(
        r"(?i),\s*[A-Z]{2}\s*\d{5}(?:-\d{4})?$"
    ).unwrap();

    // Invoice number patterns
    pub static ref INVOICE_NUMBER_SAME_LINE: Regex = Regex::new(
        r"(?i)invoice[ \t]*(?:no\.|number|#|:)?[ \t]*[:#]?[ \t]*([A-Z0-9][A-Z0-9\-/.]+)"
    ).unwrap();

    pub static ref INVOICE_HEADER_ONLY: Regex = Regex::new(
        r"(?i)^invoice[ \t]*(?:no\.?|number|#)?[ \t]*[:#]?$"
    ).unwrap();

    pub static ref HASH_TOKEN: Regex = Regex::new(
        r"#[ \t]*([A-Z0-9][A-Z0-9\-/.]+)"
    ).unwrap();

    pub static ref INV_PREFIX: Regex = Regex::new(
        r"(?i)\bINV[\- ]?([A-Z0-9][A-Z0-9\-/.]+)\b"
    ).unwrap();

    pub static ref TOKEN_SEPARATOR: Regex = Regex::new(r"[\s,]+").unwrap();

    pub static ref IDENTIFIER_TOKEN: Regex = Regex::new(r"(?i)^[A-Z0-9#][A-Z0-9\-/.]*$").unwrap();

    // Purchase order
    pub static ref PO_NUMBER: Regex = Regex::new(
        r"(?i)\bpo[ \t]*(?:#|number)?[ \t]*[:\-]?[ \t]*([A-Z0-9\-/.]{3,})"
    ).unwrap();

    // Date tokens: m/d/y, month-name d, yyyy, ISO
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"(?i)\b\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}\b|\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*\s+\d{1,2},\s*\d{4}\b|\b\d{4}-\d{2}-\d{2}\b"
    ).unwrap();

    pub static ref ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();

    pub static ref US_NUMERIC_DATE: Regex = Regex::new(
        r"^(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})$"
    ).unwrap();

    pub static ref MONTH_NAME_FIRST: Regex = Regex::new(
        r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s*(\d{4})$"
    ).unwrap();

    pub static ref DAY_FIRST_MONTH_NAME: Regex = Regex::new(
        r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s+(\d{4})$"
    ).unwrap();

    // Amounts: optional currency symbol, optional thousands groups, two decimals
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"[$€£]?\s?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}\b"
    ).unwrap();

    pub static ref AMOUNT_DUE: Regex = Regex::new(
        r"(?i)amount\s*due[:\s]*([$€£]?\s?\d[\d,]*\.\d{2})\b"
    ).unwrap();

    pub static ref TOTAL_DUE: Regex = Regex::new(
        r"(?i)total\s*due[:\s]*([$€£]?\s?\d[\d,]*\.\d{2})\b"
    ).unwrap();

    pub static ref INVOICE_TOTAL: Regex = Regex::new(
        r"(?i)invoice\s*total[:\s]*([$€£]?\s?\d[\d,]*\.\d{2})\b"
    ).unwrap();

    pub static ref TOTAL: Regex = Regex::new(
        r"(?i)\btotal\b[:\s]*([$€£]?\s?\d[\d,]*\.\d{2})\b"
    ).unwrap();

    // Line items
    pub static ref QTY_LABEL: Regex = Regex::new(r"(?i)\bqty[:\s]*(\d{1,3})\b").unwrap();

    pub static ref QTY_MULTIPLIER: Regex = Regex::new(r"(?i)\b(\d{1,3})\s*(?:x\b|×)").unwrap();

    pub static ref NON_DIGIT_RUN: Regex = Regex::new(r"\D{4,}").unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}
