//! Subcommands and the file locations they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod patterns;
pub mod split;

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use billsplit_core::{JsonFileStorage, PatternStore, SplitterConfig};

/// Config and pattern file locations, with command-line overrides.
pub struct Paths {
    config: Option<PathBuf>,
    patterns: Option<PathBuf>,
}

impl Paths {
    pub fn new(config: Option<PathBuf>, patterns: Option<PathBuf>) -> Self {
        Self { config, patterns }
    }

    /// `--config`, or `<config_dir>/billsplit/config.json`.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| app_dir().join("config.json"))
    }

    /// Load the configuration, falling back to defaults when no file exists.
    ///
    /// An explicit `--config` that does not exist is an error.
    pub fn load_config(&self) -> anyhow::Result<SplitterConfig> {
        let path = self.config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            return Ok(SplitterConfig::from_file(&path)?);
        }
        if self.config.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Ok(SplitterConfig::default())
    }

    /// `--patterns`, then `patterns_file` from the config, then
    /// `<config_dir>/billsplit/patterns.json`.
    pub fn patterns_path(&self, config: &SplitterConfig) -> PathBuf {
        self.patterns
            .clone()
            .or_else(|| config.patterns_file.clone())
            .unwrap_or_else(|| app_dir().join("patterns.json"))
    }

    /// Open the persisted pattern store.
    pub fn open_store(&self, config: &SplitterConfig) -> anyhow::Result<PatternStore<JsonFileStorage>> {
        let path = self.patterns_path(config);
        debug!("Using pattern store {}", path.display());
        Ok(PatternStore::open(JsonFileStorage::new(path))?)
    }
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billsplit")
}

/// Percentage bar used by the split commands.
pub fn percent_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Read an input PDF, with a clear message when it is missing.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(std::fs::read(path)?)
}
