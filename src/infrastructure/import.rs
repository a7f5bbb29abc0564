//! Bulk ASIN import from delimited-table files.
//!
//! The file must carry a header row with a column whose name contains
//! "asin" (case-insensitive). Values are normalized and validated; invalid
//! cells are counted and skipped, and duplicates within the file collapse
//! to one entry. Every failure mode is a user-visible message, never a
//! panic: unsupported extension, unreadable file, empty file, or a header
//! without an ASIN column.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::domain::value_objects::Asin;

/// Import failures reported to the operator.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported file format \"{0}\"; upload a .csv, .tsv, or .txt file")]
    UnsupportedExtension(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse file: {0}")]
    Malformed(#[from] csv::Error),
    #[error("the uploaded file is empty")]
    EmptyFile,
    #[error("no column containing \"asin\" found in the file")]
    MissingAsinColumn,
}

/// Result of a successful extraction.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Unique, validated identifiers in file order.
    pub asins: Vec<Asin>,
    /// Cells that failed validation and were skipped.
    pub skipped: usize,
}

/// Reads and parses a delimited file into validated identifiers.
///
/// # Errors
/// See [`ImportError`]; none of these abort the caller's existing set.
pub async fn extract_asins(path: &Path) -> Result<ImportOutcome, ImportError> {
    let delimiter = delimiter_for(path)?;
    let bytes = tokio::fs::read(path).await?;
    parse_rows(&bytes, delimiter)
}

fn delimiter_for(path: &Path) -> Result<u8, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "csv" | "txt" => Ok(b','),
        "tsv" => Ok(b'\t'),
        other => Err(ImportError::UnsupportedExtension(other.to_string())),
    }
}

/// Parses raw delimited bytes: header scan, extraction, validation, dedupe.
pub fn parse_rows(bytes: &[u8], delimiter: u8) -> Result<ImportOutcome, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(ImportError::EmptyFile),
    };
    let asin_column = header
        .iter()
        .position(|cell| cell.to_lowercase().contains("asin"))
        .ok_or(ImportError::MissingAsinColumn)?;

    let mut seen = HashSet::new();
    let mut asins = Vec::new();
    let mut skipped = 0;
    for record in records {
        let record = record?;
        let Some(cell) = record.get(asin_column) else {
            continue;
        };
        match Asin::parse(cell) {
            Ok(asin) => {
                if seen.insert(asin.clone()) {
                    asins.push(asin);
                }
            }
            Err(_) => skipped += 1,
        }
    }

    debug!(
        extracted = asins.len(),
        skipped, "finished ASIN extraction"
    );
    Ok(ImportOutcome { asins, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_column_by_fuzzy_header_match() {
        let data = b"Product ASIN,Title\nB000000000,Widget\nb000000001,Gadget\n";
        let outcome = parse_rows(data, b',').unwrap();
        assert_eq!(outcome.asins.len(), 2);
        assert_eq!(outcome.asins[1].as_str(), "B000000001");
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn skips_invalid_values_and_collapses_duplicates() {
        let data = b"asin\nB000000000\nnot-an-asin\nB000000000\n";
        let outcome = parse_rows(data, b',').unwrap();
        assert_eq!(outcome.asins.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn missing_asin_column_is_reported() {
        let data = b"sku,title\nX1,Widget\n";
        let err = parse_rows(data, b',').unwrap_err();
        assert!(matches!(err, ImportError::MissingAsinColumn));
    }

    #[test]
    fn empty_file_is_reported() {
        let err = parse_rows(b"", b',').unwrap_err();
        assert!(matches!(err, ImportError::EmptyFile));
    }

    #[test]
    fn header_only_file_yields_no_entries() {
        let outcome = parse_rows(b"asin,title\n", b',').unwrap();
        assert!(outcome.asins.is_empty());
    }

    #[test]
    fn tab_delimited_input_uses_tab_delimiter() {
        let data = b"rank\tasin\n1\tB000000005\n";
        let outcome = parse_rows(data, b'\t').unwrap();
        assert_eq!(outcome.asins[0].as_str(), "B000000005");
    }

    #[test]
    fn spreadsheet_extension_is_rejected_up_front() {
        let err = delimiter_for(Path::new("products.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedExtension(ext) if ext == "xlsx"));
    }
}
