//! WASM bindings for the bill statement splitter.
//!
//! Splitting runs synchronously on the calling thread; hosts that need a
//! responsive UI should call it from a worker.

use js_sys::{Array, Function, Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use billsplit_core::statement::naming;
use billsplit_core::{
    ExtractedField, MemoryStorage, PatternField, PatternSet, PatternStore, ProgressSink,
    SplitResult, StatementSplitter,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Forwards progress percentages to a JS callback.
struct JsProgress {
    callback: Option<Function>,
}

impl ProgressSink for JsProgress {
    fn on_progress(&mut self, percent: u8) {
        if let Some(callback) = &self.callback {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from(percent)) {
                web_sys::console::warn_2(&JsValue::from_str("progress callback failed:"), &e);
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileOutput<'a> {
    account_number: Option<&'a str>,
    customer_name: Option<&'a str>,
    file_name: &'a str,
    page_index: usize,
    fields: &'a [ExtractedField],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SplitOutput<'a> {
    files: Vec<FileOutput<'a>>,
    errors: Vec<String>,
    success_count: usize,
    error_count: usize,
    page_count: usize,
}

/// Convert a split result to a JS object, attaching each page PDF as a
/// `Uint8Array` under `blob`.
fn to_js(result: &SplitResult) -> Result<JsValue, JsValue> {
    let output = SplitOutput {
        files: result
            .files
            .iter()
            .map(|f| FileOutput {
                account_number: f.account_number.as_deref(),
                customer_name: f.customer_name.as_deref(),
                file_name: &f.file_name,
                page_index: f.page_index,
                fields: &f.fields,
            })
            .collect(),
        errors: result.error_messages(),
        success_count: result.success_count(),
        error_count: result.error_count(),
        page_count: result.page_count,
    };

    let value = serde_wasm_bindgen::to_value(&output).map_err(js_err)?;
    let files: Array = Reflect::get(&value, &JsValue::from_str("files"))?.dyn_into()?;
    for (entry, file) in files.iter().zip(&result.files) {
        let blob = Uint8Array::from(file.blob.as_slice());
        Reflect::set(&entry, &JsValue::from_str("blob"), &blob)?;
    }
    Ok(value)
}

fn parse_patterns(patterns: JsValue) -> Result<PatternSet, JsValue> {
    if patterns.is_undefined() || patterns.is_null() {
        return Ok(PatternSet::defaults());
    }
    serde_wasm_bindgen::from_value(patterns).map_err(js_err)
}

fn parse_field(field: &str) -> Result<PatternField, JsValue> {
    field.parse().map_err(|e: String| JsValue::from_str(&e))
}

fn run_split(
    patterns: &PatternSet,
    pdf: &[u8],
    month_year: Option<String>,
    progress: Option<Function>,
) -> Result<JsValue, JsValue> {
    let mut splitter = StatementSplitter::new(patterns);
    if let Some(label) = month_year.as_deref() {
        splitter = splitter.with_month_year(label);
    }
    let mut sink = JsProgress { callback: progress };
    let result = splitter
        .split_with_progress(pdf, &mut sink)
        .map_err(js_err)?;
    to_js(&result)
}

/// Split a statement PDF into one PDF per page.
///
/// `patterns` is `{ accountPatterns, namePatterns }` or `undefined` for the
/// defaults. `progress` receives a percentage after every page.
#[wasm_bindgen]
pub fn split_statements(
    pdf: &[u8],
    patterns: JsValue,
    month_year: Option<String>,
    progress: Option<Function>,
) -> Result<JsValue, JsValue> {
    let patterns = parse_patterns(patterns)?;
    run_split(&patterns, pdf, month_year, progress)
}

/// Build `{account}_{name}[_{label}].pdf`.
#[wasm_bindgen]
pub fn build_file_name(
    account_number: Option<String>,
    customer_name: Option<String>,
    month_year: Option<String>,
) -> String {
    naming::build_file_name(
        account_number.as_deref(),
        customer_name.as_deref(),
        month_year.as_deref(),
    )
}

/// Build the archive name for a batch of split files.
#[wasm_bindgen]
pub fn build_archive_name(account_number: Option<String>, month_year: Option<String>) -> String {
    naming::build_archive_name(account_number.as_deref(), month_year.as_deref())
}

#[wasm_bindgen]
pub fn normalize_month_year(label: &str) -> Option<String> {
    naming::normalize_month_year(label)
}

/// The built-in pattern set.
#[wasm_bindgen]
pub fn default_patterns() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&PatternSet::defaults()).map_err(js_err)
}

/// Editable pattern set for browser use.
///
/// Persistence belongs to the host: read `toJson()` after each change and
/// pass it back to the constructor on the next load.
#[wasm_bindgen]
pub struct PatternEditor {
    store: PatternStore<MemoryStorage>,
}

#[wasm_bindgen]
impl PatternEditor {
    /// Create an editor from saved JSON, or the defaults when `saved` is empty.
    #[wasm_bindgen(constructor)]
    pub fn new(saved: Option<String>) -> Result<PatternEditor, JsValue> {
        let storage = match saved.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => {
                let patterns: PatternSet = serde_json::from_str(json).map_err(js_err)?;
                MemoryStorage::with_patterns(patterns)
            }
            None => MemoryStorage::new(),
        };
        let store = PatternStore::open(storage).map_err(js_err)?;
        Ok(Self { store })
    }

    /// Patterns for `"account"` or `"name"`, in priority order.
    pub fn list(&self, field: &str) -> Result<Vec<String>, JsValue> {
        Ok(self.store.list(parse_field(field)?).to_vec())
    }

    /// Append a pattern after validating its syntax.
    pub fn add(&mut self, field: &str, pattern: &str) -> Result<(), JsValue> {
        self.store.add(parse_field(field)?, pattern).map_err(js_err)
    }

    /// Remove the pattern at `index` and return it.
    pub fn remove(&mut self, field: &str, index: usize) -> Result<String, JsValue> {
        self.store.remove(parse_field(field)?, index).map_err(js_err)
    }

    /// Restore the defaults.
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.store.reset().map_err(js_err)
    }

    /// The pattern set as a JS object.
    pub fn patterns(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.store.patterns()).map_err(js_err)
    }

    /// The pattern set as JSON text for host storage.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.store.patterns()).map_err(js_err)
    }

    /// Split a PDF with a snapshot of the current patterns.
    pub fn split(
        &self,
        pdf: &[u8],
        month_year: Option<String>,
        progress: Option<Function>,
    ) -> Result<JsValue, JsValue> {
        run_split(&self.store.snapshot(), pdf, month_year, progress)
    }
}
