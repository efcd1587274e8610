//! Domain types for the signal dashboard

pub mod row;
pub mod table;

pub use row::{Row, SignalFlags, SignalKind};
pub use table::{SignalSchema, Table, TickerProfile};

/// Ticker code as it appears in the sheet (e.g. "2330").
pub type Ticker = String;
