//! Property tests for the query and presentation layers.
//!
//! Uses proptest to verify:
//! 1. `ticker_list` is sorted and duplicate-free
//! 2. Unknown tickers give an empty series and a scorecard without panicking
//! 3. The first volume bar of any non-empty series is the up colour
//! 4. Re-deriving the ticker list from one ticker's series yields exactly that ticker
//! 5. `summary_stats` inside one TTL window is identical and fetches once

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as Days, NaiveDate};
use proptest::prelude::*;

use vmr_core::cache::ManualClock;
use vmr_core::chart::{render_chart, volume_colors, ChartStyle, Palette};
use vmr_core::data::{SourceKind, StoreError, TableSource};
use vmr_core::domain::{Row, SignalFlags, SignalKind, SignalSchema, Table};
use vmr_core::query::{
    series_for, ticker_info, ticker_list, QueryService, QuerySettings, ScorecardParams,
};

// ── Strategies ───────────────────────────────────────────────────────

const TICKERS: [&str; 5] = ["1101", "2317", "2330", "2454", "3008"];

fn arb_flags() -> impl Strategy<Value = SignalFlags> {
    (0u8..8).prop_map(|mask| {
        SignalKind::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, k)| k)
            .collect()
    })
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        0..TICKERS.len(),
        0i64..90,
        1.0..1000.0_f64,
        0.0..1.0e6_f64,
        arb_flags(),
    )
        .prop_map(|(t, day, close, volume, signal_flags)| Row {
            ticker: TICKERS[t].to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::days(day),
            open: close * 0.99,
            high: close * 1.02,
            low: close * 0.97,
            close,
            volume,
            signal_flags,
        })
}

/// Rows in arbitrary order with `(ticker, date)` kept unique.
fn arb_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(arb_row(), 0..120).prop_map(|rows| {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|r| seen.insert((r.ticker.clone(), r.trade_date)))
            .collect();
        Table::from_rows(
            rows,
            SignalSchema::Tiered {
                following: true,
                generic: true,
            },
        )
    })
}

struct CountingSource {
    table: Table,
    calls: Arc<AtomicUsize>,
}

impl TableSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Fixture
    }

    fn fetch_all(&self) -> Result<Table, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.table.clone())
    }
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ticker_list_sorted_and_unique(table in arb_table()) {
        let tickers = ticker_list(&table);
        prop_assert!(tickers.windows(2).all(|w| w[0] < w[1]));
        let distinct: HashSet<&str> = table.rows.iter().map(|r| r.ticker.as_str()).collect();
        prop_assert_eq!(tickers.len(), distinct.len());
    }

    #[test]
    fn unknown_ticker_is_empty_not_a_panic(table in arb_table()) {
        prop_assert!(series_for(&table, "9999").is_empty());
        let info = ticker_info(&table, "9999", &BTreeMap::new(), &ScorecardParams::default());
        prop_assert_eq!(info.latest_price_date, None);
        prop_assert_eq!(info.tags_in_5days, 0);
    }

    #[test]
    fn series_is_ascending(table in arb_table(), t in 0..TICKERS.len()) {
        let series = series_for(&table, TICKERS[t]);
        prop_assert!(series.windows(2).all(|w| w[0].trade_date < w[1].trade_date));
    }

    #[test]
    fn first_volume_bar_is_up(table in arb_table(), t in 0..TICKERS.len()) {
        let series = series_for(&table, TICKERS[t]);
        let palette = Palette::scanner();
        if let Some(first) = volume_colors(&series, &palette).first() {
            prop_assert_eq!(*first, palette.volume_up);
        }
        let spec = render_chart(&series, table.schema, ChartStyle::Line, &palette);
        prop_assert_eq!(spec.chart().is_some(), !series.is_empty());
    }

    #[test]
    fn series_round_trips_to_its_ticker(table in arb_table(), t in 0..TICKERS.len()) {
        let ticker = TICKERS[t];
        let series = series_for(&table, ticker);
        prop_assume!(!series.is_empty());
        let filtered = Table::from_rows(series, table.schema);
        prop_assert_eq!(ticker_list(&filtered), vec![ticker.to_string()]);
    }

    #[test]
    fn summary_stable_within_ttl(table in arb_table(), elapsed in 0u64..600) {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = Arc::new(ManualClock::new());
        let service = QueryService::new(
            Box::new(CountingSource { table, calls: Arc::clone(&calls) }),
            QuerySettings::default(),
            clock.clone(),
        );

        let first = service.summary_stats();
        clock.advance(Duration::from_secs(elapsed));
        let second = service.summary_stats();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            format!("{:?}", first.outcomes.win_rate.map(f64::to_bits)),
            format!("{:?}", second.outcomes.win_rate.map(f64::to_bits))
        );
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn fetch_repeats_after_ttl() {
    let calls = Arc::new(AtomicUsize::new(0));
    let clock = Arc::new(ManualClock::new());
    let service = QueryService::new(
        Box::new(CountingSource {
            table: Table::empty(),
            calls: Arc::clone(&calls),
        }),
        QuerySettings::default(),
        clock.clone(),
    );

    service.ticker_list();
    service.series_for("2330");
    clock.advance(Duration::from_secs(600));
    service.ticker_list();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
