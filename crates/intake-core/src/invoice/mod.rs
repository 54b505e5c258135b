//! Invoice field extraction module.

mod normalize;
mod parser;
pub mod rules;

pub use normalize::{normalize, NormalizeMode};
pub use parser::{ExtractionReport, HeuristicInvoiceParser, InvoiceParser};

/// Version of the default strategy orders and window sizes.
///
/// Bump whenever a default changes the records produced for the same text.
pub const RULESET_VERSION: &str = "2";
