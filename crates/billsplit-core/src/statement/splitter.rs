//! Page splitter: turns one concatenated statement PDF into one PDF per page.
//!
//! Pages are processed strictly in order on the calling thread. A page that
//! yields neither an account number nor a customer name is recorded as a
//! [`ProcessingError`] and skipped; only invalid input, an unreadable PDF,
//! an invalid pattern or cancellation abort the whole call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::naming::OutputNamer;
use super::rules::{CommonFieldExtractor, FieldExtractor, PatternFieldExtractor};
use crate::error::{BillsplitError, Result};
use crate::models::config::SplitterConfig;
use crate::models::statement::{PageResult, PageText, ProcessingError, SplitResult};
use crate::patterns::{PatternField, PatternSet};
use crate::pdf::{find_pdf_header, PdfExtractor, PdfProcessor};

/// Lifecycle of one split call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    Idle,
    /// Working on the page with this zero-based index.
    Extracting { page_index: usize },
    Completed,
    /// The call aborted with a fatal error.
    Failed,
}

/// Receives state changes and progress percentages during a split.
///
/// Any `FnMut(u8)` closure works as a sink that only tracks percentages.
pub trait ProgressSink {
    /// Called on every state transition.
    fn on_state(&mut self, _state: SplitState) {}

    /// Called after each page with the share of pages processed (0-100).
    fn on_progress(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// A sink that ignores all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _percent: u8) {}
}

/// Shared flag for aborting a running split; checked once per page.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Splits statement PDFs using a snapshot of the pattern set.
#[derive(Debug, Clone)]
pub struct StatementSplitter {
    patterns: PatternSet,
    month_year: Option<String>,
    namer: OutputNamer,
    common_fields: bool,
    try_empty_password: bool,
    cancellation: Option<CancellationToken>,
}

impl StatementSplitter {
    /// Create a splitter. The pattern lists are copied, so later changes to
    /// the pattern store do not affect this splitter.
    pub fn new(patterns: &PatternSet) -> Self {
        Self {
            patterns: patterns.clone(),
            month_year: None,
            namer: OutputNamer::new(),
            common_fields: true,
            try_empty_password: true,
            cancellation: None,
        }
    }

    /// Create a splitter with options taken from the configuration.
    pub fn from_config(patterns: &PatternSet, config: &SplitterConfig) -> Self {
        let mut splitter = Self::new(patterns)
            .with_placeholder(&config.extraction.unknown_placeholder)
            .with_common_fields(config.extraction.extract_common_fields)
            .with_empty_password(config.pdf.try_empty_password);
        splitter.month_year = config.output.month_year.clone();
        splitter
    }

    /// Append a month/year label to every file name.
    pub fn with_month_year(mut self, label: &str) -> Self {
        self.month_year = Some(label.to_string());
        self
    }

    /// Set the placeholder used for a missing account number or name.
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.namer = self.namer.with_placeholder(placeholder);
        self
    }

    /// Enable or disable best-effort common field extraction.
    pub fn with_common_fields(mut self, enabled: bool) -> Self {
        self.common_fields = enabled;
        self
    }

    /// Set whether encrypted PDFs are retried with an empty password.
    pub fn with_empty_password(mut self, enabled: bool) -> Self {
        self.try_empty_password = enabled;
        self
    }

    /// Abort the split when the token is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The pattern snapshot this splitter uses.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn month_year(&self) -> Option<&str> {
        self.month_year.as_deref()
    }

    /// Split a PDF without progress reporting.
    pub fn split(&self, pdf: &[u8]) -> Result<SplitResult> {
        self.split_with_progress(pdf, &mut NoProgress)
    }

    /// Split a PDF, reporting state and progress to `progress`.
    pub fn split_with_progress(
        &self,
        pdf: &[u8],
        progress: &mut dyn ProgressSink,
    ) -> Result<SplitResult> {
        progress.on_state(SplitState::Idle);

        let loaded = validate_input(pdf).and_then(|_| {
            let mut extractor = PdfExtractor::new().with_empty_password(self.try_empty_password);
            extractor.load(pdf)?;
            Ok(extractor)
        });

        match loaded {
            Ok(extractor) => self.run(&extractor, progress),
            Err(e) => {
                warn!("Split aborted: {}", e);
                progress.on_state(SplitState::Failed);
                Err(e)
            }
        }
    }

    /// Split an already-loaded document.
    pub fn split_document<P: PdfProcessor + ?Sized>(
        &self,
        processor: &P,
        progress: &mut dyn ProgressSink,
    ) -> Result<SplitResult> {
        progress.on_state(SplitState::Idle);
        self.run(processor, progress)
    }

    fn run<P: PdfProcessor + ?Sized>(
        &self,
        processor: &P,
        progress: &mut dyn ProgressSink,
    ) -> Result<SplitResult> {
        let result = self.process_pages(processor, progress);
        match &result {
            Ok(_) => progress.on_state(SplitState::Completed),
            Err(e) => {
                warn!("Split aborted: {}", e);
                progress.on_state(SplitState::Failed);
            }
        }
        result
    }

    fn process_pages<P: PdfProcessor + ?Sized>(
        &self,
        processor: &P,
        progress: &mut dyn ProgressSink,
    ) -> Result<SplitResult> {
        let start = Instant::now();

        let extractors = PageExtractors {
            account: PatternFieldExtractor::compile(
                PatternField::Account.label(),
                self.patterns.get(PatternField::Account),
            )?,
            name: PatternFieldExtractor::compile(
                PatternField::Name.label(),
                self.patterns.get(PatternField::Name),
            )?,
            common: self.common_fields.then(CommonFieldExtractor::new),
        };

        let pages = processor.extract_pages(None)?;
        let total = pages.len();
        let mut result = SplitResult {
            page_count: total,
            ..SplitResult::default()
        };

        for (processed, page) in pages.iter().enumerate() {
            if self.is_cancelled() {
                info!("Split cancelled after {} of {} pages", processed, total);
                return Err(BillsplitError::Cancelled { processed, total });
            }

            progress.on_state(SplitState::Extracting {
                page_index: page.page_index,
            });

            match self.process_page(page, processor, &extractors) {
                Ok(page_result) => {
                    debug!(
                        "Page {} -> {}",
                        page.page_index, page_result.file_name
                    );
                    result.files.push(page_result);
                }
                Err(error) => {
                    warn!("{}", error);
                    result.errors.push(error);
                }
            }

            progress.on_progress(percent(processed + 1, total));
        }

        info!(
            "Split {} pages into {} files with {} errors in {:?}",
            total,
            result.success_count(),
            result.error_count(),
            start.elapsed()
        );
        Ok(result)
    }

    fn process_page<P: PdfProcessor + ?Sized>(
        &self,
        page: &PageText,
        processor: &P,
        extractors: &PageExtractors,
    ) -> std::result::Result<PageResult, ProcessingError> {
        let account = extractors.account.extract(&page.content);
        let name = extractors.name.extract(&page.content);

        if account.is_none() && name.is_none() {
            return Err(ProcessingError::new(
                page.page_index,
                "no account number or customer name pattern matched",
            ));
        }

        let account_number = account.as_ref().map(|f| f.value.clone());
        let customer_name = name.as_ref().map(|f| f.value.clone());
        let file_name = self.namer.file_name(
            account_number.as_deref(),
            customer_name.as_deref(),
            self.month_year.as_deref(),
        );

        let blob = processor.extract_page(page.page_index).map_err(|e| {
            ProcessingError::new(page.page_index, format!("failed to extract page: {}", e))
        })?;

        let mut fields: Vec<_> = account.into_iter().chain(name).collect();
        if let Some(common) = &extractors.common {
            fields.extend(common.extract_all(&page.content));
        }

        Ok(PageResult {
            account_number,
            customer_name,
            file_name,
            page_index: page.page_index,
            fields,
            blob,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

struct PageExtractors {
    account: PatternFieldExtractor,
    name: PatternFieldExtractor,
    common: Option<CommonFieldExtractor>,
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done * 100) / total).min(100) as u8
}

/// Reject input that is empty or does not carry a PDF header.
fn validate_input(pdf: &[u8]) -> Result<()> {
    if pdf.is_empty() {
        return Err(BillsplitError::InvalidInput("input is empty".to_string()));
    }
    if find_pdf_header(pdf).is_none() {
        return Err(BillsplitError::InvalidInput(
            "input is not a PDF (missing %PDF- header)".to_string(),
        ));
    }
    Ok(())
}

/// Split a PDF with the given patterns and optional month/year label.
pub fn split_statements(
    pdf: &[u8],
    patterns: &PatternSet,
    month_year: Option<&str>,
    progress: &mut dyn ProgressSink,
) -> Result<SplitResult> {
    let mut splitter = StatementSplitter::new(patterns);
    if let Some(label) = month_year {
        splitter = splitter.with_month_year(label);
    }
    splitter.split_with_progress(pdf, progress)
}
