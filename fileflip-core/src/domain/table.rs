//! Source table extracted from a statement

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Column names (left-to-right document order) plus a few sample rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    pub column_names: Vec<String>,
    #[serde(default)]
    pub preview_rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Table with columns only
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_names: columns.into_iter().map(Into::into).collect(),
            preview_rows: Vec::new(),
        }
    }

    /// Read the header and up to `preview_rows` records from a CSV export
    pub fn from_csv(path: &Path, preview_rows: usize) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Other(format!("Failed to read CSV file: {}", e)))?;

        let column_names: Vec<String> = reader
            .headers()
            .map_err(|e| Error::Other(format!("Failed to read CSV header: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if column_names.iter().all(|c| c.is_empty()) {
            return Err(Error::validation("CSV file has no header row"));
        }

        let mut rows = Vec::new();
        for record in reader.records().take(preview_rows) {
            let record = record.map_err(|e| Error::Other(format!("Failed to read CSV row: {}", e)))?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(Self {
            column_names,
            preview_rows: rows,
        })
    }

    /// Value of `column` in the first sample row
    pub fn sample_value(&self, column: &str) -> Option<&str> {
        let idx = self.column_names.iter().position(|c| c == column)?;
        self.preview_rows
            .first()
            .and_then(|row| row.get(idx))
            .map(|s| s.as_str())
    }
}
