//! Local CSV export of the signal sheet.
//!
//! Same header layout as the spreadsheet. Used offline and for demos.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::provider::{SourceKind, StoreError, TableSource};
use super::records::parse_records;
use crate::domain::Table;

pub struct CsvSource {
    path: PathBuf,
    label: String,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("csv:{}", path.display());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::CsvExport
    }

    fn fetch_all(&self) -> Result<Table, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Connection(format!(
                "CSV export not found: {}",
                self.path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| StoreError::Connection(format!("{}: {e}", self.path.display())))?;

        let mut values: Vec<Vec<Value>> = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| StoreError::ResponseFormat(format!("malformed CSV: {e}")))?;
            values.push(
                record
                    .iter()
                    .map(|field| Value::String(field.to_string()))
                    .collect(),
            );
        }

        let table = parse_records(&values);
        tracing::info!(
            path = %self.path.display(),
            rows = table.len(),
            skipped = table.skipped_rows,
            "loaded CSV export"
        );
        Ok(table)
    }
}
