//! Batch command - process many OCR transcripts at once.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use docbr_core::{ExtractedRecord, Orchestrator, PipelineConfig, RawText};

use super::extract::{format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns (e.g. "scans/*.txt")
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory for per-file results
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output format for per-file results
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write a summary.csv with one row per transcript
    #[arg(long)]
    summary: bool,

    /// Continue processing when a file fails to read
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        PipelineConfig::from_file(Path::new(path))?
    } else {
        PipelineConfig::default()
    };

    let files = collect_files(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No input files found");
    }

    println!(
        "{} Found {} transcript(s) to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let orchestrator = Orchestrator::new(config);

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut results: Vec<(PathBuf, ExtractedRecord)> = Vec::new();
    let mut failed = 0usize;

    for file in &files {
        progress.set_message(
            file.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );

        match process_file(&orchestrator, file, &args.output_dir, args.format) {
            Ok(record) => {
                debug!(
                    "Processed {} with confidence {:.2}",
                    file.display(),
                    record.confidence
                );
                results.push((file.clone(), record));
            }
            Err(e) => {
                failed += 1;
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", file.display(), e);
                } else {
                    progress.finish_and_clear();
                    return Err(e.context(format!("Failed to process {}", file.display())));
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let low_confidence = results.iter().filter(|(_, r)| r.confidence < 0.5).count();

    println!(
        "{} Processed {} transcript(s) in {:.1}s ({} failed, {} low-confidence)",
        style("✓").green(),
        results.len(),
        start.elapsed().as_secs_f64(),
        failed,
        low_confidence
    );

    Ok(())
}

/// Expand input arguments: literal paths are kept, anything else is globbed.
fn collect_files(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }

        for entry in glob::glob(input)? {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn process_file(
    orchestrator: &Orchestrator,
    file: &Path,
    output_dir: &Path,
    format: OutputFormat,
) -> anyhow::Result<ExtractedRecord> {
    let text = fs::read_to_string(file)?;

    info!("Processing {}", file.display());
    let record = orchestrator.process(&RawText::from(text.as_str()));

    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Text => "txt",
    };
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let output_path = output_dir.join(format!("{}.{}", stem, extension));

    fs::write(&output_path, format_record(&record, format)?)?;

    Ok(record)
}

fn write_summary(path: &Path, results: &[(PathBuf, ExtractedRecord)]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "document_type",
        "full_name",
        "national_id",
        "card_number",
        "confidence",
        "method",
        "errors",
    ])?;

    for (file, record) in results {
        wtr.write_record([
            &file.display().to_string(),
            &format!("{:?}", record.document_type).to_lowercase(),
            &record.full_name.clone().unwrap_or_default(),
            &record.national_id.clone().unwrap_or_default(),
            &record.card_number.clone().unwrap_or_default(),
            &format!("{:.2}", record.confidence),
            &format!("{:?}", record.method).to_lowercase(),
            &record.errors.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
