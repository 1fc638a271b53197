//! Split command - one PDF per statement page.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::ProgressBar;
use tracing::{debug, info};

use billsplit_core::statement::naming::DEFAULT_ARCHIVE_NAME;
use billsplit_core::{
    build_archive_name, PatternSet, ProgressSink, SplitResult, SplitState, SplitterConfig,
    StatementSplitter,
};

use super::{percent_bar, read_input, Paths};

/// Arguments for the split command.
#[derive(Args)]
pub struct SplitArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory (default: named after the archive name)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Month/year label appended to file names, e.g. "01-2024"
    #[arg(short, long)]
    month_year: Option<String>,

    /// Also write a CSV manifest of pages and errors
    #[arg(long)]
    manifest: bool,

    /// Report what would be written without writing files
    #[arg(long)]
    dry_run: bool,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

/// Drives the progress bar from splitter callbacks.
pub struct BarSink<'a> {
    pb: &'a ProgressBar,
}

impl<'a> BarSink<'a> {
    pub fn new(pb: &'a ProgressBar) -> Self {
        Self { pb }
    }
}

impl ProgressSink for BarSink<'_> {
    fn on_state(&mut self, state: SplitState) {
        match state {
            SplitState::Idle => self.pb.set_message("Loading PDF..."),
            SplitState::Extracting { page_index } => {
                self.pb.set_message(format!("Page {}", page_index + 1))
            }
            SplitState::Completed => self.pb.set_message("Done"),
            SplitState::Failed => self.pb.set_message("Failed"),
        }
    }

    fn on_progress(&mut self, percent: u8) {
        self.pb.set_position(u64::from(percent));
    }
}

pub async fn run(args: SplitArgs, paths: &Paths) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = paths.load_config()?;
    let store = paths.open_store(&config)?;

    info!("Splitting file: {}", args.input.display());

    let data = read_input(&args.input)?;
    let splitter = build_splitter(store.patterns(), &config, args.month_year.as_deref());

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        percent_bar()?
    };
    let result = splitter.split_with_progress(&data, &mut BarSink::new(&pb));
    pb.finish_and_clear();
    let result = result?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(archive_stem(&result, &config, splitter.month_year())));

    let written = if args.dry_run {
        planned_paths(&result, &output_dir)
    } else {
        write_outputs(&result, &output_dir, args.manifest || config.output.write_manifest)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, &written, args.dry_run);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build a splitter from config, letting a command-line label win.
pub fn build_splitter(
    patterns: &PatternSet,
    config: &SplitterConfig,
    month_year: Option<&str>,
) -> StatementSplitter {
    let splitter = StatementSplitter::from_config(patterns, config);
    match month_year {
        Some(label) => splitter.with_month_year(label),
        None => splitter,
    }
}

/// Archive name for a split, without the `.zip` extension.
pub fn archive_stem(result: &SplitResult, config: &SplitterConfig, month_year: Option<&str>) -> String {
    let account = result.files.iter().find_map(|f| f.account_number.as_deref());
    let mut name = build_archive_name(account, month_year);
    if name == DEFAULT_ARCHIVE_NAME {
        name = config.output.default_archive_name.clone();
    }
    name.trim_end_matches(".zip").to_string()
}

/// Paths the split files would be written to, one per successful page.
fn planned_paths(result: &SplitResult, output_dir: &Path) -> Vec<PathBuf> {
    let mut used = HashSet::new();
    result
        .files
        .iter()
        .map(|f| output_dir.join(unique_name(&f.file_name, f.page_index, &mut used)))
        .collect()
}

/// Write every split page, plus the manifest when requested.
pub fn write_outputs(
    result: &SplitResult,
    output_dir: &Path,
    manifest: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let paths = planned_paths(result, output_dir);
    for (file, path) in result.files.iter().zip(&paths) {
        fs::write(path, &file.blob)?;
        debug!("Wrote page {} to {}", file.page_index, path.display());
    }

    if manifest {
        let manifest_path = output_dir.join("manifest.csv");
        write_manifest(&manifest_path, result, &paths)?;
        debug!("Wrote manifest to {}", manifest_path.display());
    }

    Ok(paths)
}

/// Keep names unique within one output directory.
///
/// Two pages with the same account and name would otherwise overwrite each
/// other, so later duplicates get the one-based page number appended, plus a
/// counter if that name is taken as well.
fn unique_name(file_name: &str, page_index: usize, used: &mut HashSet<String>) -> String {
    if used.insert(file_name.to_string()) {
        return file_name.to_string();
    }
    let stem = file_name.trim_end_matches(".pdf");
    let base = format!("{}_p{}", stem, page_index + 1);
    let mut candidate = format!("{}.pdf", base);
    let mut attempt = 1;
    while !used.insert(candidate.clone()) {
        attempt += 1;
        candidate = format!("{}_{}.pdf", base, attempt);
    }
    candidate
}

fn write_manifest(path: &Path, result: &SplitResult, written: &[PathBuf]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "page_index",
        "status",
        "file_name",
        "account_number",
        "customer_name",
        "error",
    ])?;

    for (file, path) in result.files.iter().zip(written) {
        let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        wtr.write_record([
            &file.page_index.to_string(),
            "success",
            file_name,
            file.account_number.as_deref().unwrap_or(""),
            file.customer_name.as_deref().unwrap_or(""),
            "",
        ])?;
    }

    for error in &result.errors {
        wtr.write_record([
            &error.page_index.to_string(),
            "error",
            "",
            "",
            "",
            &error.reason,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_summary(result: &SplitResult, written: &[PathBuf], dry_run: bool) {
    let verb = if dry_run { "Would write" } else { "Wrote" };
    for path in written {
        println!("  {} {}", style("→").cyan(), path.display());
    }

    println!();
    println!(
        "{} {} {} files from {} pages",
        style("✓").green(),
        verb,
        written.len(),
        result.page_count
    );
    println!(
        "   {} successful, {} failed",
        style(result.success_count()).green(),
        style(result.error_count()).red()
    );

    if !result.errors.is_empty() {
        println!();
        println!("{}", style("Errors:").red());
        for message in result.error_messages() {
            println!("  - {}", message);
        }
    }
}
