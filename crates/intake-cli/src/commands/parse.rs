//! Parse command - extract a record from a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use intake_core::{
    AcquisitionConfig, HeuristicInvoiceParser, IntakeConfig, InvoiceParser, NormalizeMode,
    OcrModelConfig, TextAcquirer, TextSource,
};

use super::config::load_config;
use super::output::{format_invoice, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Emit the full extraction report (normalized text, raw dates, strategy trace, warnings)
    #[arg(long)]
    report: bool,

    /// Keep line breaks when normalizing text
    #[arg(long)]
    keep_lines: bool,

    /// Skip OCR and use only embedded PDF text
    #[arg(long)]
    text_only: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Document text together with where it came from.
pub struct DocumentText {
    pub text: String,
    /// `None` for plain text input.
    pub source: Option<TextSource>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    pb.set_message("Reading document...");
    let acquirer = build_acquirer(&config.acquisition, args.model_dir.clone(), args.text_only);
    let document = read_document(&args.input, &acquirer)?;
    if let Some(source) = document.source {
        debug!("Text source: {}", source);
    }

    pb.set_message("Extracting invoice data...");
    let parser = build_parser(&config, args.keep_lines);

    let output = if args.report {
        let report = parser.parse_with_report(&document.text);
        for warning in &report.warnings {
            debug!("{}", warning);
        }
        serde_json::to_string_pretty(&report)?
    } else {
        let invoice = parser.parse(&document.text);
        format_invoice(&invoice, args.format, config.extraction.form_line_limit)?
    };

    pb.finish_and_clear();

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Parser configured from `config`, optionally forcing line-preserving
/// normalization.
pub fn build_parser(config: &IntakeConfig, keep_lines: bool) -> HeuristicInvoiceParser {
    let parser = HeuristicInvoiceParser::from_config(&config.extraction);
    if keep_lines {
        parser.with_normalize_mode(NormalizeMode::KeepLines)
    } else {
        parser
    }
}

/// Text acquirer with OCR attached unless `text_only` is set.
pub fn build_acquirer(
    acquisition: &AcquisitionConfig,
    model_dir: Option<PathBuf>,
    text_only: bool,
) -> TextAcquirer {
    let mut acquisition = acquisition.clone();
    if model_dir.is_some() {
        acquisition.ocr.model_dir = model_dir;
    }

    let ocr = acquisition.ocr.clone();
    let acquirer = TextAcquirer::new(acquisition);
    if text_only {
        acquirer
    } else {
        attach_ocr(acquirer, ocr)
    }
}

#[cfg(feature = "onnx")]
fn attach_ocr(acquirer: TextAcquirer, ocr: OcrModelConfig) -> TextAcquirer {
    use std::sync::Arc;

    if ocr.model_dir.is_none() {
        debug!("No OCR model directory configured");
        return acquirer;
    }
    acquirer.with_ocr(Arc::new(intake_core::OcrHandle::onnx(ocr)))
}

#[cfg(not(feature = "onnx"))]
fn attach_ocr(acquirer: TextAcquirer, ocr: OcrModelConfig) -> TextAcquirer {
    if ocr.model_dir.is_some() {
        tracing::warn!("Built without the onnx feature, OCR fallback is disabled");
    }
    acquirer
}

/// Read the text of a PDF or plain text file.
pub fn read_document(path: &Path, acquirer: &TextAcquirer) -> anyhow::Result<DocumentText> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let acquired = acquirer.acquire_path(path)?;
            Ok(DocumentText {
                text: acquired.text,
                source: Some(acquired.source),
            })
        }
        "txt" | "text" => Ok(DocumentText {
            text: fs::read_to_string(path)?,
            source: None,
        }),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}
