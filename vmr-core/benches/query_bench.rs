//! Criterion benchmarks for the query and presentation hot paths.
//!
//! Benchmarks:
//! 1. Record parsing (sheet values → table)
//! 2. Ticker list and single-ticker series over a multi-year table
//! 3. Scorecard computation
//! 4. Chart + table spec rendering for one ticker

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

use vmr_core::chart::{render_chart, render_table, ChartStyle, Palette, SCANNER_LIMIT};
use vmr_core::data::parse_records;
use vmr_core::domain::Table;
use vmr_core::query::{series_for, summary_stats, ticker_info, ticker_list, OutcomeFigures, ScorecardParams};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_values(tickers: usize, days: usize) -> Vec<Vec<Value>> {
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut values = vec![[
        "TICKER",
        "TRADE_DATE",
        "OPEN",
        "HIGH",
        "LOW",
        "CLOSE",
        "VOLUME",
        "FIRST_SIGNAL",
        "FOLLOWING_SIGNAL",
    ]
    .iter()
    .map(|h| json!(h))
    .collect()];

    for t in 0..tickers {
        for d in 0..days {
            let close = 100.0 + ((t * 7 + d) as f64 * 0.1).sin() * 10.0;
            values.push(vec![
                json!(1101 + t),
                json!((base + Duration::days(d as i64)).format("%Y-%m-%d").to_string()),
                json!(close - 0.5),
                json!(close + 1.5),
                json!(close - 1.5),
                json!(close),
                json!(10_000 + (d * 37 % 5_000)),
                json!(u8::from(d % 23 == 0)),
                json!(u8::from(d % 23 == 5)),
            ]);
        }
    }
    values
}

fn make_table(tickers: usize, days: usize) -> Table {
    parse_records(&make_values(tickers, days))
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_records");
    for &tickers in &[10, 100] {
        let values = make_values(tickers, 500);
        group.bench_with_input(BenchmarkId::from_parameter(tickers), &values, |b, v| {
            b.iter(|| parse_records(black_box(v)))
        });
    }
    group.finish();
}

fn bench_views(c: &mut Criterion) {
    let table = make_table(100, 500);
    let mut group = c.benchmark_group("views");

    group.bench_function("ticker_list", |b| b.iter(|| ticker_list(black_box(&table))));
    group.bench_function("series_for", |b| {
        b.iter(|| series_for(black_box(&table), black_box("1150")))
    });
    group.bench_function("summary_stats", |b| {
        let outcomes = OutcomeFigures::default();
        b.iter(|| summary_stats(black_box(&table), &outcomes))
    });
    group.bench_function("ticker_info", |b| {
        let directory = BTreeMap::new();
        let params = ScorecardParams::default();
        b.iter(|| ticker_info(black_box(&table), "1150", &directory, &params))
    });
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let table = make_table(1, 750);
    let series = series_for(&table, "1101");
    let palette = Palette::scanner();
    let mut group = c.benchmark_group("render");

    for style in [ChartStyle::Line, ChartStyle::Candlestick] {
        group.bench_with_input(
            BenchmarkId::new("chart", format!("{style:?}")),
            &style,
            |b, &style| b.iter(|| render_chart(black_box(&series), table.schema, style, &palette)),
        );
    }
    group.bench_function("signal_table", |b| {
        b.iter(|| render_table(black_box(&series), table.schema, SCANNER_LIMIT))
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_views, bench_render);
criterion_main!(benches);
