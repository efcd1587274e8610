//! VMR Observatory core: signal table access, query views, chart specs.
//!
//! Data flows one way:
//! - a `TableSource` (Google Sheets or a CSV export) yields the flat table
//! - `QueryService` caches it for a TTL window and derives per-ticker views
//! - `chart` turns a series into chart and table specifications
//!
//! Nothing here writes back to the store.

pub mod cache;
pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod query;
pub mod telemetry;
