//! Record parsing shared by every table source.
//!
//! Input is a header row followed by record rows of loosely typed cells, the
//! shape both the Sheets values API and a CSV export produce. Output is a
//! validated `Table` with its signal schema resolved.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::domain::{Row, SignalFlags, SignalKind, SignalSchema, Table, TickerProfile};

const TICKER: &str = "TICKER";
const TRADE_DATE: &str = "TRADE_DATE";
const NAME_COLUMNS: [&str; 2] = ["STOCK_NAME", "NAME"];
const INDUSTRY: &str = "INDUSTRY";

static BLANK: Value = Value::Null;

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    ticker: Option<usize>,
    trade_date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
    name: Option<usize>,
    industry: Option<usize>,
    signals: Vec<(SignalKind, usize)>,
}

impl Columns {
    fn resolve(header: &[Value]) -> Self {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(i, v)| cell_text(v).map(|name| (name.to_ascii_uppercase(), i)))
            .collect();
        let get = |name: &str| index.get(name).copied();

        let signals = SignalKind::ALL
            .into_iter()
            .filter_map(|kind| get(kind.column()).map(|i| (kind, i)))
            .collect();

        Self {
            ticker: get(TICKER),
            trade_date: get(TRADE_DATE),
            open: get("OPEN"),
            high: get("HIGH"),
            low: get("LOW"),
            close: get("CLOSE"),
            volume: get("VOLUME"),
            name: NAME_COLUMNS.iter().find_map(|c| get(*c)),
            industry: get(INDUSTRY),
            signals,
        }
    }

    fn schema(&self) -> SignalSchema {
        let has = |kind| self.signals.iter().any(|(k, _)| *k == kind);
        SignalSchema::resolve(
            has(SignalKind::First),
            has(SignalKind::Following),
            has(SignalKind::Generic),
        )
    }
}

/// Parse a header row plus records into a table.
///
/// An empty input (no header) yields an empty table. Records with a blank
/// ticker, an unparseable date, or a duplicate `(ticker, date)` are skipped.
pub fn parse_records(values: &[Vec<Value>]) -> Table {
    let Some((header, records)) = values.split_first() else {
        return Table::empty();
    };

    let cols = Columns::resolve(header);
    let schema = cols.schema();

    let (Some(ticker_col), Some(date_col)) = (cols.ticker, cols.trade_date) else {
        tracing::warn!(
            has_ticker = cols.ticker.is_some(),
            has_trade_date = cols.trade_date.is_some(),
            "sheet header lacks TICKER or TRADE_DATE, no rows usable"
        );
        return Table {
            rows: Vec::new(),
            schema,
            has_ticker_column: cols.ticker.is_some(),
            profiles: BTreeMap::new(),
            skipped_rows: records.len(),
        };
    };

    let mut rows = Vec::with_capacity(records.len());
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::with_capacity(records.len());
    let mut profiles: BTreeMap<String, TickerProfile> = BTreeMap::new();
    let mut skipped = 0usize;

    for (line, record) in records.iter().enumerate() {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or(&BLANK);

        let Some(ticker) = cell_text(cell(Some(ticker_col))) else {
            skipped += 1;
            continue;
        };
        let Some(trade_date) = cell_date(cell(Some(date_col))) else {
            tracing::warn!(line = line + 2, %ticker, "unparseable TRADE_DATE, row skipped");
            skipped += 1;
            continue;
        };
        if !seen.insert((ticker.clone(), trade_date)) {
            tracing::warn!(%ticker, %trade_date, "duplicate (ticker, date), keeping first");
            skipped += 1;
            continue;
        }

        let signal_flags: SignalFlags = cols
            .signals
            .iter()
            .filter(|(_, i)| cell_flag(cell(Some(*i))))
            .map(|(kind, _)| *kind)
            .collect();

        let profile = profiles.entry(ticker.clone()).or_default();
        if profile.name.is_none() {
            profile.name = cell_text(cell(cols.name));
        }
        if profile.industry.is_none() {
            profile.industry = cell_text(cell(cols.industry));
        }

        rows.push(Row {
            ticker,
            trade_date,
            open: cell_f64(cell(cols.open)),
            high: cell_f64(cell(cols.high)),
            low: cell_f64(cell(cols.low)),
            close: cell_f64(cell(cols.close)),
            volume: cell_f64(cell(cols.volume)),
            signal_flags,
        });
    }

    profiles.retain(|_, p| p.name.is_some() || p.industry.is_some());

    Table {
        rows,
        schema,
        has_ticker_column: true,
        profiles,
        skipped_rows: skipped,
    }
}

/// Non-blank text content of a cell. Integral numbers render without a
/// fractional part so numeric tickers like 2330 stay "2330".
pub(crate) fn cell_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cell_f64(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(f64::NAN),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => f64::NAN,
    }
}

fn cell_flag(v: &Value) -> bool {
    match v {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::Bool(b) => *b,
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "1.0" | "true" | "y" | "yes"
        ),
        _ => false,
    }
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

fn cell_date(v: &Value) -> Option<NaiveDate> {
    match v {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => {
            let days = n.as_f64()?;
            if !(1.0..=2_958_465.0).contains(&days) {
                return None;
            }
            serial_epoch()?.checked_add_signed(Duration::days(days.floor() as i64))
        }
        _ => None,
    }
}

/// Parse the date spellings seen in sheet exports.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}
