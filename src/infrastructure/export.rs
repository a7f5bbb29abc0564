//! Report export.
//!
//! Transforms a scan's metadata and collected records into a multi-sheet
//! tabular artifact: a records sheet with a fixed, ordered field list (a
//! missing field renders as an empty cell, never an omitted one, so column
//! order is stable across rows) and, when the result set carries a summary,
//! a second sheet flattening the nested metric objects into
//! `(metric, value)` rows with dotted-path keys. Sheet files are named
//! deterministically from the scan identifier.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::domain::entities::{ProductRecord, Scan, ScanResultSet};

/// Fixed record sheet columns, in export order.
pub const PRODUCT_COLUMNS: [&str; 10] = [
    "asin", "title", "brand", "category", "rank", "price", "currency", "rating", "reviews", "url",
];

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize sheet: {0}")]
    Sheet(#[from] csv::Error),
    #[error("failed to finalize sheet: {0}")]
    Finalize(String),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// One serialized sheet: a literal header row plus data rows, CSV-encoded.
#[derive(Debug, Clone)]
pub struct ReportSheet {
    pub name: String,
    pub data: Vec<u8>,
}

/// The downloadable artifact: named sheets under a deterministic base name.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub base_name: String,
    pub sheets: Vec<ReportSheet>,
}

impl ReportArtifact {
    /// File name of each sheet, `<base>-<sheet>.csv`.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.sheets
            .iter()
            .map(|sheet| format!("{}-{}.csv", self.base_name, sheet.name))
            .collect()
    }

    /// Writes every sheet into `dir` and returns the written paths.
    pub async fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        tokio::fs::create_dir_all(dir).await?;
        let mut written = Vec::with_capacity(self.sheets.len());
        for (sheet, file_name) in self.sheets.iter().zip(self.file_names()) {
            let path = dir.join(file_name);
            tokio::fs::write(&path, &sheet.data).await?;
            written.push(path);
        }
        info!(report = %self.base_name, sheets = written.len(), "report written");
        Ok(written)
    }
}

/// Builds the report artifact for one scan's result set.
pub fn build_report(scan: &Scan, results: &ScanResultSet) -> Result<ReportArtifact, ExportError> {
    let mut sheets = vec![ReportSheet {
        name: "products".to_string(),
        data: products_sheet(&results.products)?,
    }];

    if let Some(summary) = results.summary.as_ref().filter(|v| !v.is_null()) {
        sheets.push(ReportSheet {
            name: "summary".to_string(),
            data: summary_sheet(summary)?,
        });
    }

    Ok(ReportArtifact {
        base_name: format!("scan-{}-report", scan.id),
        sheets,
    })
}

fn products_sheet(products: &[ProductRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PRODUCT_COLUMNS)?;
    for record in products {
        writer.write_record(project_record(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Finalize(e.to_string()))
}

/// Projects one record into the fixed column order, empty for missing.
fn project_record(record: &ProductRecord) -> [String; PRODUCT_COLUMNS.len()] {
    fn cell<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    [
        cell(&record.asin),
        cell(&record.title),
        cell(&record.brand),
        cell(&record.category),
        cell(&record.rank),
        cell(&record.price),
        cell(&record.currency),
        cell(&record.rating),
        cell(&record.reviews),
        cell(&record.url),
    ]
}

fn summary_sheet(summary: &Value) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["metric", "value"])?;
    for (path, value) in flatten_metrics(summary) {
        writer.write_record([path, value])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Finalize(e.to_string()))
}

/// Flattens a nested summary object into dotted-path rows, depth-first.
/// Array elements are indexed as `path.N`.
#[must_use]
pub fn flatten_metrics(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = join_path(prefix, key);
                flatten_into(&path, child, rows);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = join_path(prefix, &index.to_string());
                flatten_into(&path, child, rows);
            }
        }
        Value::Null => rows.push((prefix.to_string(), String::new())),
        Value::String(s) => rows.push((prefix.to_string(), s.clone())),
        other => rows.push((prefix.to_string(), other.to_string())),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
