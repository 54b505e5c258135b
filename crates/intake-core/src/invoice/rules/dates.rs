//! Invoice and due date extraction.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::patterns::{
    DATE_TOKEN, DAY_FIRST_MONTH_NAME, ISO_DATE, MONTH_NAME_FIRST, US_NUMERIC_DATE,
};
use super::{window_after, window_lines, ExtractionMatch, FieldExtractor};
use crate::models::invoice::Field;

/// Invoice date labels in priority order, as `(name, pattern)`.
pub const INVOICE_DATE_LABELS: [(&str, &str); 4] = [
    ("invoice_date", r"invoice\s*date"),
    ("date_of_invoice", r"date\s+of\s+invoice"),
    ("issued_date", r"issued\s*date"),
    ("date", r"\bdate"),
];

/// Due date labels in priority order, as `(name, pattern)`.
pub const DUE_DATE_LABELS: [(&str, &str); 4] = [
    ("due_date", r"due\s*date"),
    ("payment_due", r"payment\s*due"),
    ("due_on", r"due\s+on"),
    ("pay_by", r"pay\s+by"),
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Fallback layouts tried after the month-first and month-name forms.
const GENERAL_FORMATS: [&str; 5] = ["%Y/%m/%d", "%Y.%m.%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y"];

type LabelRule = (&'static str, Regex);

fn compile(labels: &[(&'static str, &str)]) -> Vec<LabelRule> {
    labels
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(&format!(r"(?i){}\b", pattern)).unwrap()))
        .collect()
}

lazy_static! {
    static ref INVOICE_DATE_RULES: Vec<LabelRule> = compile(&INVOICE_DATE_LABELS);
    static ref DUE_DATE_RULES: Vec<LabelRule> = compile(&DUE_DATE_LABELS);
}

/// Labeled date extractor.
///
/// The match value is the canonical `YYYY-MM-DD` date (empty when the token
/// cannot be read as a date); the source is the raw token.
pub struct DateExtractor {
    field: Field,
    rules: &'static [LabelRule],
    window: usize,
    follow_lines: usize,
}

impl DateExtractor {
    pub fn invoice_date() -> Self {
        Self {
            field: Field::InvoiceDate,
            rules: &INVOICE_DATE_RULES,
            window: 220,
            follow_lines: 2,
        }
    }

    pub fn due_date() -> Self {
        Self {
            field: Field::DueDate,
            rules: &DUE_DATE_RULES,
            window: 220,
            follow_lines: 2,
        }
    }

    pub fn with_window(mut self, chars: usize) -> Self {
        self.window = chars;
        self
    }

    pub fn with_follow_lines(mut self, lines: usize) -> Self {
        self.follow_lines = lines;
        self
    }

    /// First date token on the label line or the lines right after it.
    fn find_token<'a>(&self, window: &'a str) -> Option<&'a str> {
        let lines = window_lines(window);
        lines
            .iter()
            .take(self.follow_lines + 1)
            .find_map(|line| DATE_TOKEN.find(line).map(|m| m.as_str()))
    }
}

impl FieldExtractor for DateExtractor {
    type Output = String;

    fn field(&self) -> Field {
        self.field
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        for (name, label) in self.rules {
            // A label mention with no date nearby does not hide later ones.
            for found in label.find_iter(text) {
                let window = window_after(text, found.start(), self.window);
                if let Some(token) = self.find_token(window) {
                    let value = to_input_date(token);
                    debug!("{} matched by label {}: {} -> {:?}", self.field, name, token, value);
                    return Some(ExtractionMatch::new(value, *name, token));
                }
            }
        }

        None
    }
}

/// Canonicalize a date token to `YYYY-MM-DD`.
///
/// ISO `YYYY-MM-DD` input passes through unchanged, without a calendar check.
/// Numeric `mm/dd/yy(yy)` is read month-first with two-digit years mapped to
/// 20yy. Anything else that cannot be read as a real date yields an empty
/// string.
pub fn to_input_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if ISO_DATE.is_match(raw) {
        return raw.to_string();
    }

    if let Some(caps) = US_NUMERIC_DATE.captures(raw) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year = parse_year(&caps[3]);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return format_date(date);
        }
    }

    parse_general(raw).map(format_date).unwrap_or_default()
}

fn parse_general(raw: &str) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_NAME_FIRST.captures(raw) {
        let month = month_from_name(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DAY_FIRST_MONTH_NAME.captures(raw) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    GENERAL_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Month number for a full or abbreviated English month name.
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name == "sept" {
        return Some(9);
    }
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&name))
        .map(|i| i as u32 + 1)
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 { 2000 + year } else { year }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_input_date_numeric() {
        assert_eq!(to_input_date("03/14/2024"), "2024-03-14");
        assert_eq!(to_input_date("01/05/23"), "2023-01-05");
        assert_eq!(to_input_date("1-5-2024"), "2024-01-05");
        assert_eq!(to_input_date("2024-03-14"), "2024-03-14");
    }

    #[test]
    fn test_to_input_date_day_first_fallback() {
        // Month 14 is impossible, so the day-first layout applies.
        assert_eq!(to_input_date("14/03/2024"), "2024-03-14");
        assert_eq!(to_input_date("14.03.2024"), "2024-03-14");
        assert_eq!(to_input_date("2024/03/14"), "2024-03-14");
    }

    #[test]
    fn test_to_input_date_month_names() {
        assert_eq!(to_input_date("Jan 2, 2025"), "2025-01-02");
        assert_eq!(to_input_date("January 2 2025"), "2025-01-02");
        assert_eq!(to_input_date("Sept 5, 2024"), "2024-09-05");
        assert_eq!(to_input_date("2 January 2025"), "2025-01-02");
    }

    #[test]
    fn test_to_input_date_rejects_garbage() {
        assert_eq!(to_input_date(""), "");
        assert_eq!(to_input_date("not a date"), "");
        assert_eq!(to_input_date("13/45/2024"), "");
        assert_eq!(to_input_date("Foo 2, 2025"), "");
    }

    #[test]
    fn test_iso_passes_through() {
        assert_eq!(to_input_date(" 2024-03-14 "), "2024-03-14");
        assert_eq!(to_input_date("2024-02-30"), "2024-02-30");
    }

    #[test]
    fn test_later_label_occurrence_is_used() {
        let text = format!(
            "Invoice Date range per contract {} Invoice Date: 03/14/2024",
            "terms ".repeat(50)
        );
        let m = DateExtractor::invoice_date().extract(&text).unwrap();
        assert_eq!(m.value, "2024-03-14");
        assert_eq!(m.strategy, "invoice_date");
    }

    #[test]
    fn test_invoice_date_label() {
        let text = "Acme Invoice #12 Invoice Date: 03/14/2024 Due Date: 04/13/2024";
        let m = DateExtractor::invoice_date().extract(text).unwrap();
        assert_eq!(m.value, "2024-03-14");
        assert_eq!(m.source, "03/14/2024");
        assert_eq!(m.strategy, "invoice_date");

        let due = DateExtractor::due_date().extract(text).unwrap();
        assert_eq!(due.value, "2024-04-13");
    }

    #[test]
    fn test_date_on_following_line() {
        let text = "Invoice Date\nPO 5521\nMarch 3, 2024";
        let m = DateExtractor::invoice_date().extract(text).unwrap();
        assert_eq!(m.value, "2024-03-03");
    }

    #[test]
    fn test_follow_lines_bound() {
        let text = "Payment Due\nNet 30\nSee terms\n05/01/2024";
        assert!(DateExtractor::due_date().extract(text).is_none());
        assert!(
            DateExtractor::due_date()
                .with_follow_lines(3)
                .extract(text)
                .is_some()
        );
    }

    #[test]
    fn test_bare_date_label_fallback() {
        let text = "Invoice 991 Date 2024-01-31 Total $5.00";
        let m = DateExtractor::invoice_date().extract(text).unwrap();
        assert_eq!(m.value, "2024-01-31");
        assert_eq!(m.strategy, "date");
    }

    #[test]
    fn test_window_limits_search() {
        let text = format!("Invoice Date: {} 03/14/2024", "x".repeat(300));
        assert!(DateExtractor::invoice_date().extract(&text).is_none());
    }

    #[test]
    fn test_no_label_no_date() {
        assert!(DateExtractor::due_date().extract("Invoice 12 01/02/2024").is_none());
    }
}
