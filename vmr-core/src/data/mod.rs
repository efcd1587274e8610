//! Table sources: Google Sheets, CSV export, in-memory fixtures.

pub mod auth;
pub mod csv_source;
pub mod provider;
pub mod records;
pub mod sheets;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use csv_source::CsvSource;
pub use provider::{SourceKind, StaticSource, StoreError, TableSource};
pub use records::{parse_date, parse_records};
pub use sheets::{SheetsConfig, SheetsSource};
