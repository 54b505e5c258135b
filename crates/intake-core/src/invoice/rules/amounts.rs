//! Amount due extraction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::patterns::{AMOUNT_DUE, AMOUNT_TOKEN, INVOICE_TOTAL, TOTAL, TOTAL_DUE};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::invoice::Field;

/// Amount fallback strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountStrategy {
    AmountDue,
    TotalDue,
    InvoiceTotal,
    Total,
    /// Numerically largest amount-shaped token anywhere in the text.
    LargestUnlabeled,
}

impl AmountStrategy {
    pub const DEFAULT_ORDER: [AmountStrategy; 5] = [
        AmountStrategy::AmountDue,
        AmountStrategy::TotalDue,
        AmountStrategy::InvoiceTotal,
        AmountStrategy::Total,
        AmountStrategy::LargestUnlabeled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountStrategy::AmountDue => "amount_due",
            AmountStrategy::TotalDue => "total_due",
            AmountStrategy::InvoiceTotal => "invoice_total",
            AmountStrategy::Total => "total",
            AmountStrategy::LargestUnlabeled => "largest_unlabeled",
        }
    }

    fn apply(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let labeled = match self {
            AmountStrategy::AmountDue => &*AMOUNT_DUE,
            AmountStrategy::TotalDue => &*TOTAL_DUE,
            AmountStrategy::InvoiceTotal => &*INVOICE_TOTAL,
            AmountStrategy::Total => &*TOTAL,
            AmountStrategy::LargestUnlabeled => return largest_amount(text),
        };

        let caps = labeled.captures(text)?;
        let amount = caps.get(1)?;
        Some(
            ExtractionMatch::new(amount.as_str().trim().to_string(), self.as_str(), &caps[0])
                .with_position(amount.start(), amount.end()),
        )
    }
}

fn largest_amount(text: &str) -> Option<ExtractionMatch<String>> {
    let mut best: Option<(Decimal, regex::Match<'_>)> = None;

    for found in AMOUNT_TOKEN.find_iter(text) {
        let value = amount_value(found.as_str());
        // Strictly greater, so the earliest of equal amounts is kept.
        if best.as_ref().is_none_or(|(max, _)| value > *max) {
            best = Some((value, found));
        }
    }

    best.map(|(_, found)| {
        let amount = found.as_str().trim();
        ExtractionMatch::new(amount.to_string(), AmountStrategy::LargestUnlabeled.as_str(), amount)
            .with_position(found.start(), found.end())
    })
}

/// Numeric value of an amount string, ignoring currency symbols and
/// thousands separators. Unreadable input counts as zero.
pub fn amount_value(s: &str) -> Decimal {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// ISO currency code guessed from the symbol in an amount string.
pub fn currency_code(amount: &str) -> &'static str {
    if amount.is_empty() {
        ""
    } else if amount.contains('€') {
        "EUR"
    } else if amount.contains('£') {
        "GBP"
    } else {
        "USD"
    }
}

/// Amount due extractor.
pub struct AmountExtractor {
    order: Vec<AmountStrategy>,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self {
            order: AmountStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    pub fn with_order(mut self, order: Vec<AmountStrategy>) -> Self {
        self.order = order;
        self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = String;

    fn field(&self) -> Field {
        Field::AmountDue
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let found = self
            .order
            .iter()
            .find_map(|strategy| strategy.apply(text).filter(|m| !m.value.is_empty()))?;
        debug!("Amount matched by {}: {}", found.strategy, found.value);
        Some(found)
    }
}
