//! CLI application for splitting concatenated bill statement PDFs.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, patterns, split, Paths};

/// Bill statement splitter - one PDF per customer page
#[derive(Parser)]
#[command(name = "billsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the pattern store file
    #[arg(short, long, global = true)]
    patterns: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a statement PDF into one file per page
    Split(split::SplitArgs),

    /// Split multiple statement PDFs
    Batch(batch::BatchArgs),

    /// Show page text and the fields found on each page
    Extract(extract::ExtractArgs),

    /// Manage account number and customer name patterns
    Patterns(patterns::PatternsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let paths = Paths::new(cli.config, cli.patterns);

    match cli.command {
        Commands::Split(args) => split::run(args, &paths).await,
        Commands::Batch(args) => batch::run(args, &paths).await,
        Commands::Extract(args) => extract::run(args, &paths).await,
        Commands::Patterns(args) => patterns::run(args, &paths).await,
        Commands::Config(args) => config::run(args, &paths).await,
    }
}
