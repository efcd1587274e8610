//! Chart specification for one ticker's series.
//!
//! The spec is front-end neutral: the TUI draws it into a terminal buffer and
//! the CLI prints it as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::palette::{Palette, Rgba};
use crate::domain::{Row, SignalKind, SignalSchema};

/// Volume bars are scaled so they fill about the bottom quarter.
pub const VOLUME_AXIS_HEADROOM: f64 = 4.0;

/// Legend points are drawn this small so they only populate the legend.
pub const LEGEND_MARKER_SIZE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    /// HIGH as a line, OPEN/LOW/CLOSE as hover data.
    #[default]
    Line,
    Candlestick,
}

impl ChartStyle {
    pub fn height(self) -> u16 {
        match self {
            ChartStyle::Line => 550,
            ChartStyle::Candlestick => 600,
        }
    }

    pub fn price_axis_title(self) -> &'static str {
        match self {
            ChartStyle::Line => "High Price",
            ChartStyle::Candlestick => "Price",
        }
    }

    /// Signal columns this style reads. Candlesticks are the legacy view,
    /// built on `SIGNAL` whenever the sheet carries it.
    pub fn signal_schema(self, schema: SignalSchema) -> SignalSchema {
        match self {
            ChartStyle::Line => schema,
            ChartStyle::Candlestick => schema.generic_view(),
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ChartStyle::Line => ChartStyle::Candlestick,
            ChartStyle::Candlestick => ChartStyle::Line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub height: u16,
    pub price_axis_title: &'static str,
    pub volume_axis_title: &'static str,
    /// `[0, 4 × max volume]`.
    pub volume_axis_range: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeTrace {
    pub values: Vec<f64>,
    pub colors: Vec<Rgba>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverData {
    pub open: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PriceTrace {
    Line {
        values: Vec<f64>,
        hover: Vec<HoverData>,
        color: Rgba,
    },
    Candles {
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        increasing: Rgba,
        decreasing: Rgba,
    },
}

/// Full-height vertical line at a signal date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalMarker {
    pub kind: SignalKind,
    pub date: NaiveDate,
    /// Index into `Chart::dates`.
    pub index: usize,
    pub color: Rgba,
}

/// One near-invisible point per signal kind, for the legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendMarker {
    pub kind: SignalKind,
    pub label: &'static str,
    pub date: NaiveDate,
    pub y: f64,
    pub color: Rgba,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub ticker: String,
    pub style: ChartStyle,
    pub layout: Layout,
    pub dates: Vec<NaiveDate>,
    pub volume: VolumeTrace,
    pub price: PriceTrace,
    pub markers: Vec<SignalMarker>,
    pub legend: Vec<LegendMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartSpec {
    NoData,
    Ready(Chart),
}

impl ChartSpec {
    pub fn chart(&self) -> Option<&Chart> {
        match self {
            ChartSpec::NoData => None,
            ChartSpec::Ready(chart) => Some(chart),
        }
    }
}

/// `[0, 4 × max(volume)]`, ignoring non-finite volumes.
pub fn volume_axis_range(series: &[Row]) -> [f64; 2] {
    let max = series
        .iter()
        .map(|r| r.volume)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    [0.0, max * VOLUME_AXIS_HEADROOM]
}

/// Up/down colour per bar. The first bar has no prior close and is always up.
pub fn volume_colors(series: &[Row], palette: &Palette) -> Vec<Rgba> {
    series
        .iter()
        .enumerate()
        .map(|(i, row)| match i {
            0 => palette.volume_up,
            _ if row.close >= series[i - 1].close => palette.volume_up,
            _ => palette.volume_down,
        })
        .collect()
}

/// Build the chart for a single-ticker series sorted by date.
pub fn render_chart(
    series: &[Row],
    schema: SignalSchema,
    style: ChartStyle,
    palette: &Palette,
) -> ChartSpec {
    let Some(first) = series.first() else {
        return ChartSpec::NoData;
    };
    let ticker = first.ticker.clone();
    let schema = style.signal_schema(schema);

    let price = match style {
        ChartStyle::Line => PriceTrace::Line {
            values: series.iter().map(|r| r.high).collect(),
            hover: series
                .iter()
                .map(|r| HoverData {
                    open: r.open,
                    low: r.low,
                    close: r.close,
                })
                .collect(),
            color: palette.price_line,
        },
        ChartStyle::Candlestick => PriceTrace::Candles {
            open: series.iter().map(|r| r.open).collect(),
            high: series.iter().map(|r| r.high).collect(),
            low: series.iter().map(|r| r.low).collect(),
            close: series.iter().map(|r| r.close).collect(),
            increasing: palette.candle_up,
            decreasing: palette.candle_down,
        },
    };

    let mut markers = Vec::new();
    let mut legend = Vec::new();
    for kind in schema.overlay_kinds() {
        let colors = palette.signal(kind);
        let mut flagged = series
            .iter()
            .enumerate()
            .filter(|(_, r)| r.has_signal(kind))
            .peekable();

        if let Some((_, row)) = flagged.peek() {
            legend.push(LegendMarker {
                kind,
                label: kind.label(),
                date: row.trade_date,
                y: row.high,
                color: colors.legend,
                size: LEGEND_MARKER_SIZE,
            });
        }
        markers.extend(flagged.map(|(index, row)| SignalMarker {
            kind,
            date: row.trade_date,
            index,
            color: colors.line,
        }));
    }

    ChartSpec::Ready(Chart {
        layout: Layout {
            title: format!("{ticker} Price Action"),
            height: style.height(),
            price_axis_title: style.price_axis_title(),
            volume_axis_title: "Volume",
            volume_axis_range: volume_axis_range(series),
        },
        ticker,
        style,
        dates: series.iter().map(|r| r.trade_date).collect(),
        volume: VolumeTrace {
            values: series.iter().map(|r| r.volume).collect(),
            colors: volume_colors(series, palette),
            opacity: palette.volume_opacity,
        },
        price,
        markers,
        legend,
    })
}
