//! Table source trait and structured error types.
//!
//! The TableSource trait abstracts over where the signal sheet comes from
//! (Google Sheets, a local CSV export) so the query layer can be tested
//! against fakes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Table;

/// Structured errors from a table source.
///
/// Displayable inline in the TUI and on the CLI.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Connection(String),

    #[error("credentials rejected: {0}")]
    Auth(String),

    #[error("unexpected response from store: {0}")]
    ResponseFormat(String),

    #[error("store misconfigured: {0}")]
    Config(String),
}

impl StoreError {
    /// Errors that mean "could not reach or read the store". Everything except
    /// a local configuration mistake.
    pub fn is_connection_class(&self) -> bool {
        !matches!(self, StoreError::Config(_))
    }
}

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleSheets,
    CsvExport,
    Fixture,
}

/// A read-only source of the flat signal table.
///
/// `fetch_all` performs exactly one attempt. A reachable store with no data
/// returns an empty table, not an error.
pub trait TableSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn kind(&self) -> SourceKind;

    fn fetch_all(&self) -> Result<Table, StoreError>;
}

/// In-memory source. Serves a fixed table or a fixed failure.
pub struct StaticSource {
    outcome: Result<Table, String>,
}

impl StaticSource {
    pub fn new(table: Table) -> Self {
        Self { outcome: Ok(table) }
    }

    /// A source whose every fetch fails with a connection error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

impl TableSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Fixture
    }

    fn fetch_all(&self) -> Result<Table, StoreError> {
        match &self.outcome {
            Ok(table) => Ok(table.clone()),
            Err(msg) => Err(StoreError::Connection(msg.clone())),
        }
    }
}
