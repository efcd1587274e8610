//! Per-ticker scorecard.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::series_for;
use crate::domain::{Row, Table, TickerProfile};

/// Trailing trading rows counted by `tags_in_5days`.
pub const RECENT_ROWS: usize = 5;
const LOOKBACK_MONTHS: u32 = 24;

/// How after-signal outcomes are judged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardParams {
    /// Trading rows after the signal day that make up the outcome window.
    pub outcome_horizon_days: usize,
    /// A signal "wins" when the window's high reaches close × (1 + pct/100).
    pub win_threshold_pct: f64,
}

impl Default for ScorecardParams {
    fn default() -> Self {
        Self {
            outcome_horizon_days: 20,
            win_threshold_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: String,
    pub name: String,
    pub industry: String,
    pub latest_price_date: Option<NaiveDate>,
    pub latest_close: Option<f64>,
    /// Primary-signal rows in the 2 years up to the latest date.
    pub first_tag_count_2yr: usize,
    /// Rows with any signal among the last five rows.
    pub tags_in_5days: usize,
    /// Percent of evaluated signals that hit the win threshold.
    pub win_rate_5pct: Option<f64>,
    /// Percent of evaluated signals whose window never exceeded the signal-day high.
    pub no_higher_pct: Option<f64>,
    /// Signals with at least one later row, the denominator of both percentages.
    pub evaluated_signals: usize,
}

pub const NOT_AVAILABLE: &str = "N/A";

/// Scorecard for `ticker`. Unknown tickers produce an all-empty card.
///
/// Name and industry come from the sheet, then `directory`, then "N/A".
pub fn ticker_info(
    table: &Table,
    ticker: &str,
    directory: &BTreeMap<String, TickerProfile>,
    params: &ScorecardParams,
) -> TickerInfo {
    let series = series_for(table, ticker);
    let sheet = table.profiles.get(ticker);
    let fallback = directory.get(ticker);
    let pick = |f: fn(&TickerProfile) -> &Option<String>| {
        sheet
            .and_then(|p| f(p).clone())
            .or_else(|| fallback.and_then(|p| f(p).clone()))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    let latest = series.last();
    let primary = table.schema.primary();

    let first_tag_count_2yr = match (latest, primary) {
        (Some(last), Some(kind)) => {
            let since = last
                .trade_date
                .checked_sub_months(Months::new(LOOKBACK_MONTHS))
                .unwrap_or(NaiveDate::MIN);
            series
                .iter()
                .filter(|r| r.trade_date >= since && r.has_signal(kind))
                .count()
        }
        _ => 0,
    };

    let tags_in_5days = series
        .iter()
        .rev()
        .take(RECENT_ROWS)
        .filter(|r| r.has_any_signal())
        .count();

    let outcomes = primary
        .map(|kind| {
            let signal_idx: Vec<usize> = series
                .iter()
                .enumerate()
                .filter(|(_, r)| r.has_signal(kind))
                .map(|(i, _)| i)
                .collect();
            evaluate_outcomes(&series, &signal_idx, params)
        })
        .unwrap_or_default();

    TickerInfo {
        ticker: ticker.to_string(),
        name: pick(|p| &p.name),
        industry: pick(|p| &p.industry),
        latest_price_date: latest.map(|r| r.trade_date),
        latest_close: latest.map(|r| r.close).filter(|c| c.is_finite()),
        first_tag_count_2yr,
        tags_in_5days,
        win_rate_5pct: outcomes.pct(outcomes.wins),
        no_higher_pct: outcomes.pct(outcomes.no_higher),
        evaluated_signals: outcomes.evaluated,
    }
}

#[derive(Debug, Default)]
struct OutcomeTally {
    evaluated: usize,
    wins: usize,
    no_higher: usize,
}

impl OutcomeTally {
    fn pct(&self, n: usize) -> Option<f64> {
        (self.evaluated > 0).then(|| n as f64 * 100.0 / self.evaluated as f64)
    }
}

fn evaluate_outcomes(series: &[Row], signal_idx: &[usize], params: &ScorecardParams) -> OutcomeTally {
    let mut tally = OutcomeTally::default();
    for &i in signal_idx {
        let signal = &series[i];
        let end = (i + 1 + params.outcome_horizon_days).min(series.len());
        let window = &series[i + 1..end];
        let peak = window
            .iter()
            .map(|r| r.high)
            .filter(|h| h.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if !peak.is_finite() || !signal.close.is_finite() {
            continue;
        }
        tally.evaluated += 1;
        if peak >= signal.close * (1.0 + params.win_threshold_pct / 100.0) {
            tally.wins += 1;
        }
        if signal.high.is_finite() && peak <= signal.high {
            tally.no_higher += 1;
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignalFlags, SignalKind, SignalSchema};

    fn bar(day: u32, high: f64, close: f64, first: bool) -> Row {
        Row {
            ticker: "2330".into(),
            trade_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high,
            low: close,
            close,
            volume: 1_000.0,
            signal_flags: if first {
                SignalFlags::EMPTY.with(SignalKind::First)
            } else {
                SignalFlags::EMPTY
            },
        }
    }

    fn tiered(rows: Vec<Row>) -> Table {
        Table::from_rows(
            rows,
            SignalSchema::Tiered {
                following: false,
                generic: false,
            },
        )
    }

    #[test]
    fn unknown_ticker_yields_empty_card() {
        let info = ticker_info(&Table::empty(), "9999", &BTreeMap::new(), &ScorecardParams::default());
        assert_eq!(info.name, NOT_AVAILABLE);
        assert_eq!(info.latest_price_date, None);
        assert_eq!(info.first_tag_count_2yr, 0);
        assert_eq!(info.win_rate_5pct, None);
    }

    #[test]
    fn win_and_no_higher_rates() {
        let table = tiered(vec![
            bar(1, 101.0, 100.0, true),
            bar(4, 106.0, 104.0, false), // +6% over the first signal's close
            bar(5, 110.0, 108.0, true),
            bar(6, 109.0, 107.0, false), // never above 110
            bar(7, 108.0, 107.0, true),  // no later rows, not evaluated
        ]);
        let params = ScorecardParams {
            outcome_horizon_days: 2,
            win_threshold_pct: 5.0,
        };
        let info = ticker_info(&table, "2330", &BTreeMap::new(), &params);
        assert_eq!(info.evaluated_signals, 2);
        assert_eq!(info.win_rate_5pct, Some(50.0));
        assert_eq!(info.no_higher_pct, Some(50.0));
        assert_eq!(info.first_tag_count_2yr, 3);
        assert_eq!(info.tags_in_5days, 3);
        assert_eq!(info.latest_close, Some(107.0));
    }

    #[test]
    fn directory_fills_missing_profile() {
        let mut directory = BTreeMap::new();
        directory.insert(
            "2330".to_string(),
            TickerProfile {
                name: Some("TSMC".into()),
                industry: None,
            },
        );
        let table = tiered(vec![bar(1, 1.0, 1.0, false)]);
        let info = ticker_info(&table, "2330", &directory, &ScorecardParams::default());
        assert_eq!(info.name, "TSMC");
        assert_eq!(info.industry, NOT_AVAILABLE);
    }

    #[test]
    fn two_year_window_excludes_old_signals() {
        let mut old = bar(1, 1.0, 1.0, true);
        old.trade_date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let table = tiered(vec![old, bar(1, 1.0, 1.0, true), bar(2, 1.0, 1.0, false)]);
        let info = ticker_info(&table, "2330", &BTreeMap::new(), &ScorecardParams::default());
        assert_eq!(info.first_tag_count_2yr, 1);
    }
}
