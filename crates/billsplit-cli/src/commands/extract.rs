//! Extract command - dump page text and the fields found on each page.
//!
//! Useful for writing new patterns: it shows exactly the collapsed text the
//! splitter matches against.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use billsplit_core::pdf::{PdfExtractor, PdfProcessor};
use billsplit_core::statement::rules::{CommonFieldExtractor, FieldExtractor, PatternFieldExtractor};
use billsplit_core::{ExtractedField, PatternField};

use super::{read_input, Paths};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Only read the first N pages (default: pdf.max_pages from config)
    #[arg(short = 'n', long)]
    max_pages: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text
    Text,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageReport {
    page_index: usize,
    text: String,
    fields: Vec<ExtractedField>,
}

pub async fn run(args: ExtractArgs, paths: &Paths) -> anyhow::Result<()> {
    let config = paths.load_config()?;
    let store = paths.open_store(&config)?;
    let patterns = store.patterns();

    let account = PatternFieldExtractor::compile(
        PatternField::Account.label(),
        patterns.get(PatternField::Account),
    )?;
    let name = PatternFieldExtractor::compile(
        PatternField::Name.label(),
        patterns.get(PatternField::Name),
    )?;
    let common = CommonFieldExtractor::new();

    let data = read_input(&args.input)?;
    let mut extractor = PdfExtractor::new().with_empty_password(config.pdf.try_empty_password);
    extractor.load(&data)?;

    let max_pages = args.max_pages.or_else(|| config.max_pages());
    let pages = extractor.extract_pages(max_pages)?;

    let reports: Vec<PageReport> = pages
        .into_iter()
        .map(|page| {
            let mut fields: Vec<ExtractedField> = account
                .extract(&page.content)
                .into_iter()
                .chain(name.extract(&page.content))
                .collect();
            if config.extraction.extract_common_fields {
                fields.extend(common.extract_all(&page.content));
            }
            PageReport {
                page_index: page.page_index,
                text: page.content,
                fields,
            }
        })
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => print_text(&reports, extractor.page_count()),
    }

    Ok(())
}

fn print_text(reports: &[PageReport], total_pages: usize) {
    println!(
        "{} Showing {} of {} pages",
        style("ℹ").blue(),
        reports.len(),
        total_pages
    );

    for report in reports {
        println!();
        println!(
            "{}",
            style(format!("Page {} (index {})", report.page_index + 1, report.page_index)).bold()
        );
        println!("  {}", report.text);

        if report.fields.is_empty() {
            println!("  {}", style("no fields found").yellow());
        }
        for field in &report.fields {
            println!(
                "  {}: {} ({:.0}%)",
                field.name,
                field.value,
                field.confidence * 100.0
            );
        }
    }
}
