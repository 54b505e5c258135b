//! Line item extraction from column-like text chunks.

use tracing::debug;

use super::patterns::{AMOUNT_TOKEN, NON_DIGIT_RUN, QTY_LABEL, QTY_MULTIPLIER, WHITESPACE_RUN};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::invoice::{Field, LineItem};

/// Split text into candidate line item chunks.
///
/// Breaks on whitespace runs of two or more characters, on any run that
/// contains a line break, and on a single whitespace character sitting
/// between two digits. Chunks are trimmed; empty chunks are dropped.
pub fn split_chunks(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].1.is_whitespace() {
            i += 1;
            continue;
        }

        let mut j = i;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }

        let run = &chars[i..j];
        let between_digits = i > 0
            && chars[i - 1].1.is_ascii_digit()
            && chars.get(j).is_some_and(|(_, c)| c.is_ascii_digit());

        if run.len() >= 2 || run.iter().any(|(_, c)| *c == '\n') || between_digits {
            push_chunk(&mut chunks, &text[start..chars[i].0]);
            start = chars.get(j).map_or(text.len(), |(pos, _)| *pos);
        }

        i = j;
    }

    push_chunk(&mut chunks, &text[start..]);
    chunks
}

fn push_chunk<'a>(chunks: &mut Vec<&'a str>, chunk: &'a str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
}

/// Line item extractor.
pub struct LineItemExtractor {
    cap: usize,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self { cap: 5 }
    }

    /// Set the maximum number of items returned.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Read one chunk as a line item.
    ///
    /// Requires a quantity signal, a price token and a run of at least four
    /// non-digit characters.
    pub fn parse_chunk(chunk: &str) -> Option<LineItem> {
        let quantity = QTY_LABEL
            .captures(chunk)
            .or_else(|| QTY_MULTIPLIER.captures(chunk))
            .and_then(|caps| caps[1].parse::<u32>().ok())?;
        let price = AMOUNT_TOKEN.find(chunk)?;

        if !NON_DIGIT_RUN.is_match(chunk) {
            return None;
        }

        let description = QTY_LABEL.replace_all(chunk, "");
        let description = QTY_MULTIPLIER.replace_all(&description, "");
        let description = AMOUNT_TOKEN.replace_all(&description, "");
        let description = WHITESPACE_RUN.replace_all(&description, " ");

        Some(LineItem {
            description: description.trim().to_string(),
            quantity,
            unit_price: price.as_str().trim().to_string(),
        })
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LineItemExtractor {
    type Output = Vec<LineItem>;

    fn field(&self) -> Field {
        Field::LineItems
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<Vec<LineItem>>> {
        let mut items = Vec::new();
        let mut sources = Vec::new();

        for chunk in split_chunks(text) {
            if items.len() >= self.cap {
                break;
            }
            if let Some(item) = Self::parse_chunk(chunk) {
                items.push(item);
                sources.push(chunk);
            }
        }

        if items.is_empty() {
            return None;
        }

        debug!("Found {} line items", items.len());
        Some(ExtractionMatch::new(items, "chunk_scan", sources.join(" | ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(description: &str, quantity: u32, unit_price: &str) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price: unit_price.to_string(),
        }
    }

    #[test]
    fn test_split_chunks() {
        assert_eq!(
            split_chunks("Bolts 2 x $1.50  Nuts qty 4 $0.25"),
            vec!["Bolts 2 x $1.50", "Nuts qty 4 $0.25"]
        );
        assert_eq!(split_chunks("a\nb c"), vec!["a", "b c"]);
        assert_eq!(split_chunks("SKU 12 34 widget"), vec!["SKU 12", "34 widget"]);
        assert!(split_chunks("   ").is_empty());
    }

    #[test]
    fn test_qty_label_chunk() {
        assert_eq!(
            LineItemExtractor::parse_chunk("Widget Assembly qty: 3 $45.00"),
            Some(item("Widget Assembly", 3, "$45.00"))
        );
    }

    #[test]
    fn test_multiplier_chunk() {
        assert_eq!(
            LineItemExtractor::parse_chunk("2 x Copper Fittings $1,250.00"),
            Some(item("Copper Fittings", 2, "$1,250.00"))
        );
        assert_eq!(
            LineItemExtractor::parse_chunk("Gasket set 10× 3.75"),
            Some(item("Gasket set", 10, "3.75"))
        );
    }

    #[test]
    fn test_rejects_numeric_noise() {
        assert_eq!(LineItemExtractor::parse_chunk("12345"), None);
        assert_eq!(LineItemExtractor::parse_chunk("3 x 4.00"), None);
        assert_eq!(LineItemExtractor::parse_chunk("Labor qty 2"), None);
    }

    #[test]
    fn test_extract_respects_cap() {
        let text = (1..=8)
            .map(|n| format!("Part {} qty {} $1{}.00", "ABCDEFGH".chars().nth(n - 1).unwrap(), n, n))
            .collect::<Vec<_>>()
            .join("  ");
        let m = LineItemExtractor::new().extract(&text).unwrap();
        assert_eq!(m.value.len(), 5);
        assert_eq!(m.value[0], item("Part A", 1, "$11.00"));

        let m = LineItemExtractor::new().with_cap(2).extract(&text).unwrap();
        assert_eq!(m.value.len(), 2);
    }

    #[test]
    fn test_no_items() {
        assert!(LineItemExtractor::new().extract("Invoice 12 Total $5.00").is_none());
        assert!(LineItemExtractor::new().extract("").is_none());
    }
}
