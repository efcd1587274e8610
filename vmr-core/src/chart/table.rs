//! Recent-signals table.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Row, SignalKind, SignalSchema};

pub const COLUMNS: [&str; 5] = ["Date", "Open", "High", "Low", "Close"];

/// Row limit on the Stock Scanner page.
pub const SCANNER_LIMIT: usize = 10;
/// Row limit on the legacy candlestick view.
pub const CLASSIC_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Row> for SignalRow {
    fn from(row: &Row) -> Self {
        Self {
            date: row.trade_date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalTable {
    /// Flag the rows were selected on. `None` when the data has no signal columns.
    pub kind: Option<SignalKind>,
    pub columns: [&'static str; 5],
    /// Newest first.
    pub rows: Vec<SignalRow>,
    /// Flagged rows before truncation.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableSpec {
    NoData,
    Ready(SignalTable),
}

impl TableSpec {
    pub fn table(&self) -> Option<&SignalTable> {
        match self {
            TableSpec::NoData => None,
            TableSpec::Ready(table) => Some(table),
        }
    }
}

/// Rows carrying the primary flag, newest first, at most `limit` of them.
pub fn render_table(series: &[Row], schema: SignalSchema, limit: usize) -> TableSpec {
    if series.is_empty() {
        return TableSpec::NoData;
    }
    let kind = schema.primary();

    let mut flagged: Vec<&Row> = match kind {
        Some(kind) => series.iter().filter(|r| r.has_signal(kind)).collect(),
        None => Vec::new(),
    };
    flagged.sort_by(|a, b| b.trade_date.cmp(&a.trade_date));
    let total = flagged.len();

    TableSpec::Ready(SignalTable {
        kind,
        columns: COLUMNS,
        rows: flagged.into_iter().take(limit).map(SignalRow::from).collect(),
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartStyle;
    use crate::domain::SignalFlags;

    fn bar(day: u32, flags: SignalFlags) -> Row {
        Row {
            ticker: "2330".into(),
            trade_date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            signal_flags: flags,
        }
    }

    #[test]
    fn newest_first_and_truncated() {
        let first = SignalFlags::EMPTY.with(SignalKind::First);
        let series: Vec<Row> = (1..=15).map(|d| bar(d, first)).collect();
        let schema = SignalSchema::Tiered {
            following: false,
            generic: false,
        };
        let spec = render_table(&series, schema, SCANNER_LIMIT);
        let table = spec.table().unwrap();
        assert_eq!(table.rows.len(), 10);
        assert_eq!(table.total, 15);
        assert_eq!(table.rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(table.rows[9].date, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());
    }

    #[test]
    fn falls_back_to_generic_signal() {
        let generic = SignalFlags::EMPTY.with(SignalKind::Generic);
        let series = vec![bar(1, generic), bar(2, SignalFlags::EMPTY)];
        let spec = render_table(&series, SignalSchema::Generic, CLASSIC_LIMIT);
        let table = spec.table().unwrap();
        assert_eq!(table.kind, Some(SignalKind::Generic));
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn following_only_rows_are_not_listed() {
        let following = SignalFlags::EMPTY.with(SignalKind::Following);
        let series = vec![bar(1, following)];
        let schema = SignalSchema::Tiered {
            following: true,
            generic: false,
        };
        let table = render_table(&series, schema, SCANNER_LIMIT);
        assert_eq!(table.table().unwrap().total, 0);
    }

    #[test]
    fn legacy_view_lists_generic_rows_of_tiered_sheet() {
        let generic = SignalFlags::EMPTY.with(SignalKind::Generic);
        let series = vec![bar(1, generic), bar(2, generic)];
        let schema = SignalSchema::Tiered {
            following: false,
            generic: true,
        };
        assert_eq!(render_table(&series, schema, CLASSIC_LIMIT).table().unwrap().total, 0);

        let legacy = ChartStyle::Candlestick.signal_schema(schema);
        let spec = render_table(&series, legacy, CLASSIC_LIMIT);
        let table = spec.table().unwrap();
        assert_eq!(table.kind, Some(SignalKind::Generic));
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn empty_series_is_no_data() {
        assert_eq!(render_table(&[], SignalSchema::Generic, 10), TableSpec::NoData);
    }
}
