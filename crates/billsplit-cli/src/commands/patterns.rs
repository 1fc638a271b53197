//! Patterns command - manage the persisted extraction patterns.

use clap::{Args, Subcommand};
use console::style;

use billsplit_core::statement::rules::confidence_for_rank;
use billsplit_core::{PatternField, SplitterConfig};

use super::Paths;

/// Arguments for the patterns command.
#[derive(Args)]
pub struct PatternsArgs {
    #[command(subcommand)]
    command: PatternsCommand,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// List patterns in priority order
    List {
        /// Only list one field ("account" or "name")
        #[arg(short, long)]
        field: Option<PatternField>,

        /// Print the stored JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a pattern (lowest priority)
    Add {
        /// Field the pattern extracts ("account" or "name")
        #[arg(short, long)]
        field: PatternField,

        /// Regular expression with exactly one capture group
        pattern: String,
    },

    /// Remove a pattern by its zero-based index
    Remove {
        /// Field the pattern belongs to ("account" or "name")
        #[arg(short, long)]
        field: PatternField,

        /// Zero-based index as shown by `list`
        index: usize,
    },

    /// Restore the built-in default patterns
    Reset,

    /// Show pattern store path
    Path,
}

pub async fn run(args: PatternsArgs, paths: &Paths) -> anyhow::Result<()> {
    let config = paths.load_config()?;

    match args.command {
        PatternsCommand::Path => {
            println!("Pattern store: {}", paths.patterns_path(&config).display());
        }
        command => edit(command, paths, &config)?,
    }

    Ok(())
}

fn edit(command: PatternsCommand, paths: &Paths, config: &SplitterConfig) -> anyhow::Result<()> {
    let mut store = paths.open_store(config)?;

    match command {
        PatternsCommand::List { field, json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.patterns())?);
                return Ok(());
            }
            let fields = match field {
                Some(field) => vec![field],
                None => vec![PatternField::Account, PatternField::Name],
            };
            for field in fields {
                println!("{} ({})", style(field.label()).bold(), field);
                let list = store.list(field);
                if list.is_empty() {
                    println!("  {}", style("no patterns").yellow());
                }
                for (index, pattern) in list.iter().enumerate() {
                    println!(
                        "  [{}] {:.1}  {}",
                        index,
                        confidence_for_rank(index),
                        pattern
                    );
                }
            }
        }
        PatternsCommand::Add { field, pattern } => {
            store.add(field, &pattern)?;
            println!(
                "{} Added {} pattern [{}]: {}",
                style("✓").green(),
                field,
                store.list(field).len() - 1,
                pattern
            );
        }
        PatternsCommand::Remove { field, index } => {
            let removed = store.remove(field, index)?;
            println!(
                "{} Removed {} pattern [{}]: {}",
                style("✓").green(),
                field,
                index,
                removed
            );
        }
        PatternsCommand::Reset => {
            store.reset()?;
            println!("{} Restored default patterns", style("✓").green());
        }
        PatternsCommand::Path => {}
    }

    Ok(())
}
