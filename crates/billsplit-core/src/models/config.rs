//! Configuration structures for the splitting pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BillsplitError, Result};

/// Main configuration for billsplit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output naming and writing configuration.
    pub output: OutputConfig,

    /// Where the pattern set is persisted (host default when unset).
    pub patterns_file: Option<PathBuf>,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages for text dumps (0 = unlimited). Splitting always
    /// processes every page.
    pub max_pages: usize,

    /// Try decrypting encrypted PDFs with an empty password.
    pub try_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            try_empty_password: true,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Also collect phone, email, date, amount and ZIP fields per page.
    pub extract_common_fields: bool,

    /// Substituted for a missing account number or customer name in file names.
    pub unknown_placeholder: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extract_common_fields: true,
            unknown_placeholder: "Unknown".to_string(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default month/year label appended to file names.
    pub month_year: Option<String>,

    /// Write a CSV manifest next to the split files.
    pub write_manifest: bool,

    /// Archive name used when no account prefix or label is available.
    pub default_archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            month_year: None,
            write_manifest: false,
            default_archive_name: crate::statement::naming::DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl SplitterConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BillsplitError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BillsplitError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Page limit for text dumps, `None` when unlimited.
    pub fn max_pages(&self) -> Option<usize> {
        (self.pdf.max_pages > 0).then_some(self.pdf.max_pages)
    }
}
