//! Table: one fetched snapshot of the signal sheet.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::row::{Row, SignalKind};

/// Which signal columns the dataset version carries.
///
/// Resolved once from the header row at fetch time; downstream code asks the
/// schema instead of probing for columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "snake_case")]
pub enum SignalSchema {
    /// No signal columns at all.
    Unsignalled,
    /// Only the generic `SIGNAL` column.
    Generic,
    /// `FIRST_SIGNAL`, optionally alongside `FOLLOWING_SIGNAL` and `SIGNAL`.
    Tiered { following: bool, generic: bool },
}

impl SignalSchema {
    /// Resolve the schema from the set of signal columns present.
    pub fn resolve(first: bool, following: bool, generic: bool) -> Self {
        match (first, generic) {
            (true, _) => SignalSchema::Tiered { following, generic },
            (false, true) => SignalSchema::Generic,
            // FOLLOWING_SIGNAL without FIRST_SIGNAL has no primary; treat as unsignalled.
            (false, false) => SignalSchema::Unsignalled,
        }
    }

    /// The flag used for the signal table and scorecard counts.
    pub fn primary(self) -> Option<SignalKind> {
        match self {
            SignalSchema::Unsignalled => None,
            SignalSchema::Generic => Some(SignalKind::Generic),
            SignalSchema::Tiered { .. } => Some(SignalKind::First),
        }
    }

    /// Kinds drawn as vertical markers on the chart, in drawing order.
    pub fn overlay_kinds(self) -> Vec<SignalKind> {
        match self {
            SignalSchema::Unsignalled => Vec::new(),
            SignalSchema::Generic => vec![SignalKind::Generic],
            SignalSchema::Tiered { following: true, .. } => {
                vec![SignalKind::First, SignalKind::Following]
            }
            SignalSchema::Tiered { following: false, .. } => vec![SignalKind::First],
        }
    }

    /// The same dataset read through its `SIGNAL` column alone, when it has one.
    pub fn generic_view(self) -> Self {
        if self.carries(SignalKind::Generic) {
            SignalSchema::Generic
        } else {
            self
        }
    }

    /// Whether any column for `kind` exists in this dataset.
    pub fn carries(self, kind: SignalKind) -> bool {
        match (self, kind) {
            (SignalSchema::Unsignalled, _) => false,
            (SignalSchema::Generic, k) => k == SignalKind::Generic,
            (SignalSchema::Tiered { .. }, SignalKind::First) => true,
            (SignalSchema::Tiered { following, .. }, SignalKind::Following) => following,
            (SignalSchema::Tiered { generic, .. }, SignalKind::Generic) => generic,
        }
    }
}

/// Descriptive columns captured per ticker when the sheet has them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub name: Option<String>,
    pub industry: Option<String>,
}

/// A fetched snapshot. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
    pub schema: SignalSchema,
    /// False when the sheet had no `TICKER` header.
    pub has_ticker_column: bool,
    pub profiles: BTreeMap<String, TickerProfile>,
    /// Records dropped during parsing (bad date, blank ticker, duplicate key).
    pub skipped_rows: usize,
}

impl Table {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            schema: SignalSchema::Unsignalled,
            has_ticker_column: false,
            profiles: BTreeMap::new(),
            skipped_rows: 0,
        }
    }

    /// Build from already-validated rows. Used by tests and synthetic sources.
    pub fn from_rows(rows: Vec<Row>, schema: SignalSchema) -> Self {
        Self {
            rows,
            schema,
            has_ticker_column: true,
            profiles: BTreeMap::new(),
            skipped_rows: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Content hash of the snapshot (blake3, hex).
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(format!("{:?}", self.schema).as_bytes());
        for row in &self.rows {
            hasher.update(row.ticker.as_bytes());
            hasher.update(&[0]);
            hasher.update(row.trade_date.to_string().as_bytes());
            for v in [row.open, row.high, row.low, row.close, row.volume] {
                hasher.update(&v.to_bits().to_le_bytes());
            }
            hasher.update(&[row.signal_flags.bits()]);
        }
        hasher.finalize().to_hex().to_string()
    }
}
