//! Batch processing command for many invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use fapiao_core::{Document, InvoiceRecord, RecordStatus};

use super::{build_processor, display_name, is_supported, load_config};
use crate::export::{write_records, ExportFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory, file or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file (default: invoices_<timestamp>.<format> in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    /// Directory containing the OCR model files
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Per-document time limit in seconds (0 = unlimited)
    #[arg(long)]
    timeout: Option<u64>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(secs) = args.timeout {
        config.batch.document_timeout_secs = secs;
    }

    let files = collect_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Unreadable files keep a failed record in their input position
    let mut documents = Vec::with_capacity(files.len());
    let mut unreadable: Vec<Option<InvoiceRecord>> = Vec::with_capacity(files.len());
    for path in &files {
        let name = display_name(path);
        match fs::read(path) {
            Ok(bytes) => {
                documents.push(Document::new(name, bytes));
                unreadable.push(None);
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                unreadable.push(Some(InvoiceRecord::failed(name, format!("unreadable: {}", e))));
            }
        }
    }

    let processor = build_processor(&config, args.model_dir.as_deref(), args.text_only);

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let processed = processor
        .process_batch(documents, |progress| {
            pb.set_position(progress.completed as u64);
            pb.set_message(progress.current_name.clone());
        })
        .await;

    pb.finish_with_message("Complete");

    let mut processed = processed.into_iter();
    let records: Vec<InvoiceRecord> = unreadable
        .into_iter()
        .filter_map(|slot| slot.or_else(|| processed.next()))
        .collect();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(args.format));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_records(&output, &records, args.format)?;

    print_summary(&records, &output, start);
    Ok(())
}

/// Expand a directory, a single file or a glob pattern into supported files.
fn collect_files(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);
    let pattern = if path.is_dir() {
        path.join("*").to_string_lossy().into_owned()
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    files.sort();
    Ok(files)
}

fn default_output_path(format: ExportFormat) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("invoices_{}.{}", stamp, format.extension()))
}

fn print_summary(records: &[InvoiceRecord], output: &Path, start: Instant) {
    let successful = records.iter().filter(|r| r.status.is_success()).count();
    let failed: Vec<_> = records.iter().filter(|r| r.status.is_failed()).collect();
    let partial = records.len() - successful - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        records.len(),
        start.elapsed()
    );
    println!(
        "   {} complete, {} partially missing, {} failed",
        style(successful).green(),
        style(partial).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for record in &failed {
            if let RecordStatus::Failed(reason) = &record.status {
                println!("  - {}: {}", record.source_file_name, reason);
            }
        }
    }

    println!();
    println!(
        "{} Results written to {}",
        style("✓").green(),
        output.display()
    );
}
