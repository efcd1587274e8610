//! End-to-end scenarios: sheet values → table → views → chart/table specs.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};

use vmr_core::cache::SystemClock;
use vmr_core::chart::{
    render_chart, render_table, volume_axis_range, ChartSpec, ChartStyle, Palette, PriceTrace,
    TableSpec, CLASSIC_LIMIT, SCANNER_LIMIT,
};
use vmr_core::data::{parse_records, StaticSource};
use vmr_core::domain::{SignalKind, SignalSchema};
use vmr_core::query::{series_for, QueryService, QuerySettings};

fn sheet(rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let mut values = vec![vec![
        json!("TICKER"),
        json!("TRADE_DATE"),
        json!("OPEN"),
        json!("HIGH"),
        json!("LOW"),
        json!("CLOSE"),
        json!("VOLUME"),
        json!("FIRST_SIGNAL"),
        json!("FOLLOWING_SIGNAL"),
    ]];
    values.extend(rows);
    values
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn scenario_2330_two_rows_one_signal() {
    let values = sheet(vec![
        vec![json!(2330), json!("2024-01-02"), json!(505), json!(512), json!(500), json!(510), json!(1200), json!(0), json!(0)],
        vec![json!(2330), json!("2024-01-01"), json!(495), json!(502), json!(490), json!(500), json!(1000), json!(1), json!(0)],
        vec![json!(2317), json!("2024-01-01"), json!(100), json!(101), json!(99), json!(100), json!(500), json!(1), json!(0)],
    ]);
    let table = parse_records(&values);

    let series = series_for(&table, "2330");
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].trade_date, date(2024, 1, 1));
    assert_eq!(series[1].trade_date, date(2024, 1, 2));

    let spec = render_table(&series, table.schema, SCANNER_LIMIT);
    let signal_table = spec.table().expect("series is non-empty");
    assert_eq!(signal_table.kind, Some(SignalKind::First));
    assert_eq!(signal_table.rows.len(), 1);
    assert_eq!(signal_table.rows[0].date, date(2024, 1, 1));
    assert_eq!(signal_table.rows[0].close, 500.0);
}

#[test]
fn scenario_volume_axis_is_four_times_max() {
    let values = sheet(
        [100, 200, 300]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                vec![
                    json!("2330"),
                    json!(format!("2024-01-0{}", i + 1)),
                    json!(1),
                    json!(1),
                    json!(1),
                    json!(1),
                    json!(v),
                    json!(0),
                    json!(0),
                ]
            })
            .collect(),
    );
    let table = parse_records(&values);
    let series = series_for(&table, "2330");
    assert_eq!(volume_axis_range(&series), [0.0, 1200.0]);

    let spec = render_chart(&series, table.schema, ChartStyle::Line, &Palette::scanner());
    assert_eq!(spec.chart().unwrap().layout.volume_axis_range, [0.0, 1200.0]);
}

#[test]
fn scenario_connection_failure_degrades_to_no_data() {
    let service = QueryService::new(
        Box::new(StaticSource::unreachable("invalid credentials")),
        QuerySettings::default(),
        Arc::new(SystemClock),
    );

    let snap = service.snapshot();
    assert!(snap.table.is_empty());
    assert!(snap.notice.is_some());

    let series = service.series_for("2330");
    let schema = snap.table.schema;
    assert_eq!(
        render_chart(&series, schema, ChartStyle::Line, &Palette::scanner()),
        ChartSpec::NoData
    );
    assert_eq!(render_table(&series, schema, SCANNER_LIMIT), TableSpec::NoData);
}

#[test]
fn legacy_generic_sheet_renders_candles() {
    let values = vec![
        vec![json!("TICKER"), json!("TRADE_DATE"), json!("OPEN"), json!("HIGH"), json!("LOW"), json!("CLOSE"), json!("VOLUME"), json!("SIGNAL")],
        vec![json!("2454"), json!("2024/03/01"), json!(900), json!(920), json!(890), json!(915), json!("12,000"), json!("1")],
        vec![json!("2454"), json!("2024/03/04"), json!(915), json!(918), json!(880), json!(885), json!("9,000"), json!("")],
    ];
    let table = parse_records(&values);
    assert_eq!(table.schema, SignalSchema::Generic);

    let series = series_for(&table, "2454");
    let spec = render_chart(&series, table.schema, ChartStyle::Candlestick, &Palette::classic());
    let chart = spec.chart().unwrap();
    assert!(matches!(chart.price, PriceTrace::Candles { .. }));
    assert_eq!(chart.layout.height, 600);
    assert_eq!(chart.markers.len(), 1);
    assert_eq!(chart.legend.len(), 1);
    assert_eq!(chart.legend[0].kind, SignalKind::Generic);
    assert_eq!(chart.volume.colors[1], Palette::classic().volume_down);

    let table_spec = render_table(&series, table.schema, CLASSIC_LIMIT);
    assert_eq!(table_spec.table().unwrap().rows.len(), 1);
}

#[test]
fn chart_json_is_front_end_ready() {
    let values = sheet(vec![vec![
        json!("2330"), json!("2024-01-01"), json!(495), json!(502), json!(490), json!(500), json!(1000), json!(1), json!(0),
    ]]);
    let table = parse_records(&values);
    let series = series_for(&table, "2330");
    let spec = render_chart(&series, table.schema, ChartStyle::Line, &Palette::scanner());

    let json = serde_json::to_value(&spec).unwrap();
    assert_eq!(json["state"], "ready");
    assert_eq!(json["layout"]["title"], "2330 Price Action");
    assert_eq!(json["volume"]["colors"][0], "rgba(0, 212, 170, 0.3)");
    assert_eq!(json["price"]["type"], "line");
    assert_eq!(json["legend"][0]["color"], "#ffff00");
    assert_eq!(json["markers"][0]["color"], "rgba(255, 255, 0, 0.85)");
}
