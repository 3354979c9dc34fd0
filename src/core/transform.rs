use crate::domain::model::{Record, TsvBuffer};
use crate::utils::error::{PipelineError, Result};
use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;

/// 過濾規則：欄位值必須「嚴格大於」門檻才保留
#[derive(Debug, Clone)]
pub struct FilterRule {
    pub field: String,
    pub threshold: f64,
}

impl Default for FilterRule {
    fn default() -> Self {
        Self {
            field: "price".to_string(),
            threshold: 50.0,
        }
    }
}

impl FilterRule {
    pub fn new(field: impl Into<String>, threshold: f64) -> Self {
        Self {
            field: field.into(),
            threshold,
        }
    }

    /// Strictly greater than. Records whose field is missing, null, or not
    /// a JSON number never match.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .numeric_field(&self.field)
            .map(|value| value > self.threshold)
            .unwrap_or(false)
    }
}

/// Filters the batch and renders the survivors as tab separated text, all
/// in memory. The header is the union of field names in first-seen order
/// across the whole batch, so filtered-out records still shape the columns.
pub fn filter_to_tsv(records: &[Record], rule: &FilterRule) -> Result<TsvBuffer> {
    if records.is_empty() {
        tracing::error!("❌ Data processing failed: No data provided for processing");
        return Err(PipelineError::ValidationError {
            message: "No data provided for processing".to_string(),
        });
    }

    tracing::info!("🔄 Original Data:");
    log_preview(records);

    let columns = column_order(records);
    let kept: Vec<&Record> = records.iter().filter(|r| rule.matches(r)).collect();

    tracing::info!("🔄 Filtered Data ({} > {}):", rule.field, rule.threshold);
    log_preview(kept.iter().copied());

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    writer.write_record(&columns).map_err(processing_error)?;
    for record in &kept {
        let row: Vec<String> = columns
            .iter()
            .map(|column| cell_text(record.fields.get(column)))
            .collect();
        writer.write_record(&row).map_err(processing_error)?;
    }

    let bytes = writer.into_inner().map_err(processing_error)?;

    tracing::info!(
        "✅ Data processed and saved to TXT format! ({} of {} records kept)",
        kept.len(),
        records.len()
    );
    Ok(TsvBuffer::from_bytes(bytes))
}

const PREVIEW_ROWS: usize = 5;

/// 只記錄前幾筆，完整資料不進日誌
fn log_preview<'a>(records: impl IntoIterator<Item = &'a Record>) {
    for record in records.into_iter().take(PREVIEW_ROWS) {
        tracing::info!("  {}", serde_json::Value::Object(record.fields.clone()));
    }
}

/// Field names in order of first appearance across all records.
fn column_order(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.fields.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Missing and null cells render as empty, strings go in verbatim, and any
/// other value keeps its JSON text.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn processing_error(e: impl std::fmt::Display) -> PipelineError {
    tracing::error!("❌ Data processing failed: {}", e);
    PipelineError::ProcessingError {
        message: e.to_string(),
    }
}
