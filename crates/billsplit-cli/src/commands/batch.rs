//! Batch command - split many statement PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use billsplit_core::{NoProgress, SplitResult, SplitterConfig, StatementSplitter};

use super::split::{archive_stem, build_splitter, write_outputs};
use super::{read_input, Paths};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory; each source gets a subdirectory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Month/year label appended to file names
    #[arg(short, long)]
    month_year: Option<String>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome for one source PDF.
struct SourceResult {
    path: PathBuf,
    output_dir: Option<PathBuf>,
    split: Option<SplitResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, paths: &Paths) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = paths.load_config()?;
    let store = paths.open_store(&config)?;
    let splitter = build_splitter(store.patterns(), &config, args.month_year.as_deref());

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = split_one(&path, &splitter, &config, &args.output_dir);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok((split, dir)) => results.push(SourceResult {
                path,
                output_dir: Some(dir),
                split: Some(split),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                results.push(SourceResult {
                    path,
                    output_dir: None,
                    split: None,
                    error: Some(error_msg),
                    processing_time_ms,
                });
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_report(&results, start);
    Ok(())
}

fn split_one(
    path: &Path,
    splitter: &StatementSplitter,
    config: &SplitterConfig,
    output_root: &Path,
) -> anyhow::Result<(SplitResult, PathBuf)> {
    let data = read_input(path)?;
    let result = splitter.split_with_progress(&data, &mut NoProgress)?;

    let stem = archive_stem(&result, config, splitter.month_year());
    let mut dir = output_root.join(&stem);
    if dir.exists() {
        // another source already produced this archive name
        let source = path.file_stem().and_then(|s| s.to_str()).unwrap_or("statement");
        dir = output_root.join(format!("{}_{}", stem, source));
    }

    write_outputs(&result, &dir, config.output.write_manifest)?;
    Ok((result, dir))
}

fn write_summary(path: &Path, results: &[SourceResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "output_dir",
        "pages",
        "files",
        "errors",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let output_dir = result
            .output_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();

        match &result.split {
            Some(split) => wtr.write_record([
                filename,
                "success",
                &output_dir,
                &split.page_count.to_string(),
                &split.success_count().to_string(),
                &split.error_count().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?,
            None => wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

fn print_report(results: &[SourceResult], start: Instant) {
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let pages: usize = results
        .iter()
        .filter_map(|r| r.split.as_ref())
        .map(|s| s.success_count())
        .sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} split files written, {} sources failed",
        style(pages).green(),
        style(failed.len()).red()
    );

    for result in results {
        if let (Some(split), Some(dir)) = (&result.split, &result.output_dir) {
            println!("  {} {}", style("→").cyan(), dir.display());
            for message in split.error_messages() {
                println!("      - {}", message);
            }
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
