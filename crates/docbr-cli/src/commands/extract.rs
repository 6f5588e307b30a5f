//! Extract command - run the pipeline on a single OCR transcript.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use docbr_core::{ExtractedRecord, ExtractionMethod, Orchestrator, PipelineConfig, RawText};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input transcript file (UTF-8 text; "-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence and method
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON envelope with data and metadata
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// JSON envelope mirroring what the API layer returns to the form pre-fill.
#[derive(Serialize)]
struct Envelope<'a> {
    success: bool,
    data: &'a ExtractedRecord,
    metadata: Metadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[derive(Serialize)]
struct Metadata {
    confidence: f32,
    method: ExtractionMethod,
    architecture: &'static str,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        PipelineConfig::from_file(std::path::Path::new(path))?
    } else {
        PipelineConfig::default()
    };

    let text = read_transcript(&args.input)?;
    if text.trim().is_empty() {
        // The external boundary rejects empty input; the pipeline never does
        anyhow::bail!("transcript is empty: {}", args.input.display());
    }

    info!("Processing transcript: {}", args.input.display());

    let orchestrator = Orchestrator::new(config);
    let record = orchestrator.process(&RawText::from(text.as_str()));

    let output = format_record(&record, args.format)?;

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

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            record.confidence * 100.0
        );
        println!("{} Method: {}", style("ℹ").blue(), architecture(&record));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_transcript(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(path)?)
}

fn architecture(record: &ExtractedRecord) -> &'static str {
    match record.method {
        ExtractionMethod::Modern => "modern",
        ExtractionMethod::Legacy => "legacy",
    }
}

pub fn format_record(record: &ExtractedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let envelope = Envelope {
                success: record.confidence > 0.0,
                data: record,
                metadata: Metadata {
                    confidence: record.confidence,
                    method: record.method,
                    architecture: architecture(record),
                },
                errors: record.errors.clone(),
            };
            Ok(serde_json::to_string_pretty(&envelope)?)
        }
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

pub fn format_csv(record: &ExtractedRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "document_type",
        "full_name",
        "national_id",
        "identity_number",
        "card_number",
        "birth_date",
        "sex",
        "issuer_name",
        "plan_name",
        "confidence",
        "method",
    ])?;

    wtr.write_record([
        &format!("{:?}", record.document_type).to_lowercase(),
        &record.full_name.clone().unwrap_or_default(),
        &record.national_id.clone().unwrap_or_default(),
        &record.identity_number.clone().unwrap_or_default(),
        &record.card_number.clone().unwrap_or_default(),
        &record.birth_date.map(|d| d.to_string()).unwrap_or_default(),
        &format!("{:?}", record.sex).to_lowercase(),
        &record.issuer_name.clone().unwrap_or_default(),
        &record.plan_name.clone().unwrap_or_default(),
        &format!("{:.2}", record.confidence),
        architecture(record),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(record: &ExtractedRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document type: {:?}\n", record.document_type));
    if let Some(issuer) = &record.issuer_name {
        output.push_str(&format!("Issuer: {}\n", issuer));
    }
    output.push('\n');

    if let Some(name) = &record.full_name {
        output.push_str(&format!("Name:        {}\n", name));
    }
    if let Some(cpf) = &record.national_id {
        output.push_str(&format!("CPF:         {}\n", docbr_core::rules::format_cpf(cpf)));
    }
    if let Some(rg) = &record.identity_number {
        output.push_str(&format!("RG:          {}\n", rg));
    }
    if let Some(card) = &record.card_number {
        output.push_str(&format!("Card number: {}\n", card));
    }
    if let Some(birth) = &record.birth_date {
        output.push_str(&format!("Birth date:  {}\n", birth));
    }
    if let Some(plan) = &record.plan_name {
        output.push_str(&format!("Plan:        {}\n", plan));
    }
    output.push_str(&format!("Sex:         {:?}\n", record.sex));

    output.push('\n');
    output.push_str(&format!(
        "Confidence: {:.2} ({})\n",
        record.confidence,
        architecture(record)
    ));

    if !record.errors.is_empty() {
        output.push_str("\nNotes:\n");
        for error in &record.errors {
            output.push_str(&format!("  - {}\n", error));
        }
    }

    output
}
