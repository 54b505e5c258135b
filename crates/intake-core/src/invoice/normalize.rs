//! Text normalization applied before field extraction.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How line structure is treated during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
    /// Collapse every whitespace run, line breaks included, into one space.
    ///
    /// Line items are only separated where a space sits between two digits,
    /// so multi-line tables usually need [`NormalizeMode::KeepLines`].
    #[default]
    SingleLine,
    /// Collapse horizontal whitespace only; line breaks are kept.
    KeepLines,
}

lazy_static! {
    static ref ANY_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HORIZONTAL_WHITESPACE: Regex = Regex::new(r"[^\S\n]+").unwrap();

    /// Keywords OCR engines tend to split apart, with their repaired form.
    static ref OCR_SPLIT_FIXES: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)inv\s*oice").unwrap(), "invoice"),
    ];
}

/// Normalize raw extracted text.
///
/// Non-breaking spaces become spaces, whitespace is collapsed according to
/// `mode`, split keywords are rejoined and the result is trimmed. The
/// function is total and idempotent.
pub fn normalize(raw: &str, mode: NormalizeMode) -> String {
    let text = raw.replace('\u{00a0}', " ");

    let mut text = match mode {
        NormalizeMode::SingleLine => ANY_WHITESPACE.replace_all(&text, " ").into_owned(),
        NormalizeMode::KeepLines => {
            let text = text.replace("\r\n", "\n");
            HORIZONTAL_WHITESPACE.replace_all(&text, " ").into_owned()
        }
    };

    for (pattern, replacement) in OCR_SPLIT_FIXES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    match mode {
        NormalizeMode::SingleLine => text.trim().to_string(),
        NormalizeMode::KeepLines => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_collapses_everything() {
        let raw = "  Acme\u{00a0}Supply   Co\n\n  Invoice #\t42  ";
        assert_eq!(normalize(raw, NormalizeMode::SingleLine), "Acme Supply Co invoice # 42");
    }

    #[test]
    fn test_keep_lines_preserves_breaks() {
        let raw = "Acme   Supply\r\n\r\n   Invoice  No. 42 \nTotal:  $5.00";
        assert_eq!(
            normalize(raw, NormalizeMode::KeepLines),
            "Acme Supply\ninvoice No. 42\nTotal: $5.00"
        );
    }

    #[test]
    fn test_rejoins_split_anchor() {
        assert_eq!(
            normalize("Inv oice Date 01/02/2024", NormalizeMode::SingleLine),
            "invoice Date 01/02/2024"
        );
        assert_eq!(normalize("INV  OICE", NormalizeMode::SingleLine), "invoice");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize("", NormalizeMode::SingleLine), "");
        assert_eq!(normalize(" \n\t ", NormalizeMode::KeepLines), "");
    }

    #[test]
    fn test_idempotent() {
        let raw = "ACME  LLC\n 12 Main St \n Inv oice  #A-77\u{00a0}Total $9.99";
        for mode in [NormalizeMode::SingleLine, NormalizeMode::KeepLines] {
            let once = normalize(raw, mode);
            assert_eq!(normalize(&once, mode), once);
        }
    }
}
