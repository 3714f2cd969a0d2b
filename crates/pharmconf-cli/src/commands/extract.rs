//! Extract command - read the order from a dispensing document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use pharmconf_core::extraction::{DispensingOrderParser, ExtractionResult, OrderParser};
use pharmconf_core::models::config::PharmconfConfig;
use pharmconf_core::models::order::Order;
use pharmconf_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use pharmconf_core::workflow::extract_order;

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF, or text with --text-input)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Treat the input as already extracted UTF-8 text
    #[arg(long)]
    text_input: bool,

    /// Report how many lines of the items section were dropped
    #[arg(long)]
    show_skipped: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text listing
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting order from: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    let result = if args.text_input {
        pb.set_message("Reading text...");
        pb.set_position(30);
        let text = fs::read_to_string(&args.input)?;
        DispensingOrderParser::from_config(&config.extraction).parse_text(&text)
    } else {
        extract_pdf(&args.input, &config, &pb)?
    };

    pb.finish_and_clear();

    for warning in &result.warnings {
        warn!("{}", warning);
    }

    let output = format_order(&result.order, args.format)?;

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

    if args.show_skipped {
        print_extraction_stats(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn extract_pdf(
    input: &Path,
    config: &PharmconfConfig,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    pb.set_message("Loading PDF...");
    pb.set_position(10);

    let data = fs::read(input)?;
    let mut extractor = PdfExtractor::with_config(config.pdf.clone());
    extractor.load(&data)?;
    debug!("PDF has {} pages", extractor.page_count());

    pb.set_message("Analyzing PDF...");
    pb.set_position(20);

    if extractor.analyze() == PdfType::Empty {
        warn!("PDF has little or no embedded text; the order may come out empty");
    }

    pb.set_message("Extracting order...");
    pb.set_position(50);
    let result = extract_order(&data, config)?;

    pb.set_position(100);
    Ok(result)
}

fn print_extraction_stats(result: &ExtractionResult) {
    eprintln!();
    eprintln!(
        "{} Items extracted: {}",
        style("ℹ").blue(),
        result.order.len()
    );
    eprintln!(
        "{} Lines skipped in items section: {}",
        style("ℹ").blue(),
        result.skipped_lines
    );
    eprintln!(
        "{} Header lines matched: {}",
        style("ℹ").blue(),
        result.header_matches
    );
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

fn format_order(order: &Order, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(order)?),
        OutputFormat::Csv => format_csv(order),
        OutputFormat::Text => Ok(format_text(order)),
    }
}

fn format_csv(order: &Order) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "order_number",
        "sequence",
        "active_ingredient_code",
        "name",
        "batch_lot",
        "unit",
        "quantity_requested",
    ])?;

    for item in &order.items {
        wtr.write_record([
            &order.header.order_number,
            &item.sequence.to_string(),
            &item.active_ingredient_code.to_string(),
            &item.name,
            &item.batch_lot,
            &item.unit,
            &item.quantity_requested.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(order: &Order) -> String {
    let mut output = String::new();

    for (label, value) in order.header.fields() {
        output.push_str(&format!("{}: {}\n", label, value));
    }
    output.push('\n');

    if order.is_empty() {
        output.push_str("Nenhum item atendido encontrado.\n");
        return output;
    }

    output.push_str(&format!("Itens ({}):\n", order.len()));
    for item in &order.items {
        output.push_str(&format!(
            "  {:>3}  {:<40} {:<12} {:<6} {:>6}\n",
            item.sequence, item.name, item.batch_lot, item.unit, item.quantity_requested
        ));
    }

    output
}
