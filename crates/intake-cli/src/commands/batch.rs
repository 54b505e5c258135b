//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use intake_core::{HeuristicInvoiceParser, InvoiceParser, ParsedInvoice, TextAcquirer, TextSource};

use super::config::load_config;
use super::output::{format_invoice, OutputFormat};
use super::parse::{build_acquirer, build_parser, read_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

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

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: Result<Processed, String>,
    processing_time_ms: u64,
}

struct Processed {
    invoice: ParsedInvoice,
    source: Option<TextSource>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt" | "text")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One parser and one acquirer serve every worker; the OCR backend loads
    // at most once.
    let parser = Arc::new(build_parser(&config, args.keep_lines));
    let acquirer = Arc::new(build_acquirer(
        &config.acquisition,
        args.model_dir.clone(),
        args.text_only,
    ));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut tasks = JoinSet::new();
    let mut results: Vec<Option<ProcessResult>> = Vec::with_capacity(files.len());
    results.resize_with(files.len(), || None);

    for (index, path) in files.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let parser = Arc::clone(&parser);
        let acquirer = Arc::clone(&acquirer);

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = process_single_file(&path, &parser, &acquirer).map_err(|e| e.to_string());
            let result = ProcessResult {
                path,
                outcome,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            };
            (index, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        overall_pb.inc(1);

        if let Err(error_msg) = &result.outcome {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                tasks.abort_all();
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }
        results[index] = Some(result);
    }

    overall_pb.finish_with_message("Complete");

    let results: Vec<ProcessResult> = results.into_iter().flatten().collect();
    let successful: Vec<_> = results.iter().filter(|r| r.outcome.is_ok()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_err()).collect();

    if let Some(output_dir) = &args.output_dir {
        let paths: Vec<&Path> = successful.iter().map(|r| r.path.as_path()).collect();
        let names = output_names(&paths);

        for (result, output_name) in successful.iter().zip(&names) {
            let Ok(processed) = &result.outcome else {
                continue;
            };
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            let content = format_invoice(
                &processed.invoice,
                args.format,
                config.extraction.form_line_limit,
            )?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(error_msg) = &result.outcome {
                println!("  - {}: {}", result.path.display(), error_msg);
            }
        }
    }

    Ok(())
}

/// Output base name for each input: the file stem, or the full file name
/// when several inputs share a stem (`a.pdf` and `a.txt`).
fn output_names(paths: &[&Path]) -> Vec<String> {
    let stem = |p: &Path| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("invoice")
            .to_string()
    };

    paths
        .iter()
        .map(|path| {
            let name = stem(path);
            let shared = paths.iter().filter(|other| stem(other) == name).count() > 1;
            match path.file_name().and_then(|s| s.to_str()) {
                Some(file_name) if shared => {
                    warn!("Several inputs named {}, keeping extensions in output names", name);
                    file_name.to_string()
                }
                _ => name,
            }
        })
        .collect()
}

fn process_single_file(
    path: &Path,
    parser: &HeuristicInvoiceParser,
    acquirer: &TextAcquirer,
) -> anyhow::Result<Processed> {
    let document = read_document(path, acquirer)?;
    let invoice = parser.parse(&document.text);
    if invoice.is_empty() {
        warn!("No fields recognized in {}", path.display());
    }
    Ok(Processed {
        invoice,
        source: document.source,
    })
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor",
        "invoice_number",
        "invoice_date",
        "due_date",
        "amount_due",
        "currency",
        "po_number",
        "line_items",
        "text_source",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        match &result.outcome {
            Ok(processed) => {
                let invoice = &processed.invoice;
                let source = processed
                    .source
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "text".to_string());
                let line_items = invoice.line_items.len().to_string();
                wtr.write_record([
                    filename,
                    "success",
                    invoice.vendor.as_str(),
                    invoice.invoice_number.as_str(),
                    invoice.invoice_date.as_str(),
                    invoice.due_date.as_str(),
                    invoice.amount_due.as_str(),
                    invoice.currency.as_str(),
                    invoice.po_number.as_str(),
                    line_items.as_str(),
                    source.as_str(),
                    time_ms.as_str(),
                    "",
                ])?;
            }
            Err(error_msg) => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    "",
                    time_ms.as_str(),
                    error_msg.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_use_stem() {
        let names = output_names(&[Path::new("in/a.pdf"), Path::new("in/b.txt")]);
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_output_names_keep_extension_on_shared_stem() {
        let names = output_names(&[
            Path::new("in/a.pdf"),
            Path::new("in/a.txt"),
            Path::new("in/b.txt"),
        ]);
        assert_eq!(names, vec!["a.pdf", "a.txt", "b"]);
    }
}
