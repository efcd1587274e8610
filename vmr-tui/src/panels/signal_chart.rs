//! Signal chart panel - draws a `ChartSpec` straight into the buffer.
//!
//! Layering, back to front:
//! - signal markers: full-height vertical lines at flagged dates
//! - volume bars from the bottom edge, scaled to the spec's volume axis
//! - price: a dotted HIGH line, or candles with wicks
//!
//! Each bar is one terminal column. When the series is wider than the plot,
//! the most recent bars are shown.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use vmr_core::chart::{Chart, ChartSpec, PriceTrace};

use crate::theme::{terminal_color, Theme};

const LABEL_WIDTH: u16 = 9;
const MARKER: &str = "│";
const VOLUME_BAR: &str = "░";
const LINE_POINT: &str = "•";

pub struct SignalChartPanel<'a> {
    spec: &'a ChartSpec,
    ticker: &'a str,
    theme: &'a Theme,
}

impl<'a> SignalChartPanel<'a> {
    pub fn new(spec: &'a ChartSpec, ticker: &'a str, theme: &'a Theme) -> Self {
        Self { spec, ticker, theme }
    }
}

/// Map a value to a row in the plot (0 = top).
fn value_to_y(value: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
    if (y_max - y_min).abs() < 1e-9 || plot_height == 0 {
        return 0;
    }
    let frac = (value - y_min) / (y_max - y_min);
    let y = plot_height.saturating_sub(1) as f64 * (1.0 - frac);
    y.round().max(0.0).min(plot_height.saturating_sub(1) as f64) as u16
}

/// Low/high over the visible window, ignoring non-finite values.
fn price_bounds(price: &PriceTrace, window: Range<usize>) -> Option<(f64, f64)> {
    let (lows, highs): (&[f64], &[f64]) = match price {
        PriceTrace::Line { values, .. } => (values, values),
        PriceTrace::Candles { low, high, .. } => (low, high),
    };
    let lo = lows
        .get(window.clone())?
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min);
    let hi = highs
        .get(window)?
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

impl Widget for SignalChartPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(chart) = self.spec.chart() else {
            Block::default()
                .title(format!(" {} [No Data] ", self.ticker))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted))
                .style(Style::default().bg(self.theme.background))
                .render(area, buf);
            return;
        };

        let block = Block::default()
            .title(format!(
                " {} | {} | {} bars ",
                chart.layout.title,
                chart.layout.price_axis_title,
                chart.dates.len()
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));
        let inner = block.inner(area);
        block.render(area, buf);

        // Bottom two rows: date axis, then legend.
        let plot = Rect {
            x: inner.x + LABEL_WIDTH.min(inner.width),
            y: inner.y,
            width: inner.width.saturating_sub(LABEL_WIDTH),
            height: inner.height.saturating_sub(2),
        };
        if plot.width == 0 || plot.height == 0 {
            return;
        }

        let n = chart.dates.len();
        let start = n.saturating_sub(plot.width as usize);
        let window = start..n;

        self.draw_markers(chart, plot, start, buf);
        self.draw_volume(chart, plot, window.clone(), buf);

        if let Some((lo, hi)) = price_bounds(&chart.price, window.clone()) {
            let range = hi - lo;
            let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
            let (y_lower, y_upper) = (lo - pad, hi + pad);
            self.draw_price(chart, plot, window.clone(), y_lower, y_upper, buf);

            let labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
            let rows = [0, plot.height / 2, plot.height.saturating_sub(1)];
            for (value, row) in labels.iter().zip(rows) {
                buf.set_string(
                    inner.x,
                    plot.y + row,
                    format!("{value:>8.2}"),
                    Style::default().fg(self.theme.muted),
                );
            }
        }

        self.draw_axis_and_legend(chart, plot, window, buf);
    }
}

impl SignalChartPanel<'_> {
    fn draw_markers(&self, chart: &Chart, plot: Rect, start: usize, buf: &mut Buffer) {
        for marker in chart.markers.iter().filter(|m| m.index >= start) {
            let offset = (marker.index - start) as u16;
            if offset >= plot.width {
                continue;
            }
            let style = Style::default().fg(terminal_color(marker.color));
            for y in plot.top()..plot.bottom() {
                buf.set_string(plot.x + offset, y, MARKER, style);
            }
        }
    }

    fn draw_volume(&self, chart: &Chart, plot: Rect, window: Range<usize>, buf: &mut Buffer) {
        let axis_max = chart.layout.volume_axis_range[1];
        if axis_max.is_nan() || axis_max <= 0.0 {
            return;
        }
        for (offset, i) in window.enumerate() {
            let Some(&volume) = chart.volume.values.get(i) else {
                break;
            };
            if !volume.is_finite() || volume <= 0.0 {
                continue;
            }
            let height = ((volume / axis_max) * plot.height as f64).round().max(1.0) as u16;
            let color = chart
                .volume
                .colors
                .get(i)
                .map(|c| terminal_color(*c))
                .unwrap_or(self.theme.muted);
            let style = Style::default().fg(color);
            let x = plot.x + offset as u16;
            for dy in 0..height.min(plot.height) {
                buf.set_string(x, plot.bottom() - 1 - dy, VOLUME_BAR, style);
            }
        }
    }

    fn draw_price(
        &self,
        chart: &Chart,
        plot: Rect,
        window: Range<usize>,
        y_lower: f64,
        y_upper: f64,
        buf: &mut Buffer,
    ) {
        let to_y = |v: f64| plot.y + value_to_y(v, y_lower, y_upper, plot.height);

        match &chart.price {
            PriceTrace::Line { values, color, .. } => {
                let style = Style::default()
                    .fg(terminal_color(*color))
                    .add_modifier(Modifier::BOLD);
                for (offset, i) in window.enumerate() {
                    match values.get(i) {
                        Some(v) if v.is_finite() => {
                            buf.set_string(plot.x + offset as u16, to_y(*v), LINE_POINT, style);
                        }
                        _ => {}
                    }
                }
            }
            PriceTrace::Candles {
                open,
                high,
                low,
                close,
                increasing,
                decreasing,
            } => {
                for (offset, i) in window.enumerate() {
                    let (Some(&o), Some(&h), Some(&l), Some(&c)) =
                        (open.get(i), high.get(i), low.get(i), close.get(i))
                    else {
                        break;
                    };
                    if ![o, h, l, c].iter().all(|v| v.is_finite()) {
                        continue;
                    }
                    let is_up = c >= o;
                    let style = Style::default().fg(terminal_color(if is_up {
                        *increasing
                    } else {
                        *decreasing
                    }));
                    let x = plot.x + offset as u16;

                    let body_top = to_y(o.max(c));
                    let body_bottom = to_y(o.min(c));
                    for y in to_y(h)..body_top {
                        buf.set_string(x, y, "|", style);
                    }
                    let body = if is_up { "\u{2588}" } else { "\u{2593}" };
                    for y in body_top..=body_bottom {
                        buf.set_string(x, y, body, style);
                    }
                    for y in (body_bottom + 1)..=to_y(l) {
                        buf.set_string(x, y, "|", style);
                    }
                }
            }
        }
    }

    fn draw_axis_and_legend(&self, chart: &Chart, plot: Rect, window: Range<usize>, buf: &mut Buffer) {
        let muted = Style::default().fg(self.theme.muted);
        let axis_y = plot.bottom();
        let legend_y = axis_y + 1;

        if let (Some(first), Some(last)) = (
            chart.dates.get(window.start),
            window.end.checked_sub(1).and_then(|i| chart.dates.get(i)),
        ) {
            let first = first.format("%Y-%m-%d").to_string();
            let last = last.format("%Y-%m-%d").to_string();
            buf.set_stringn(plot.x, axis_y, &first, plot.width as usize, muted);
            let last_x = plot.right().saturating_sub(last.len() as u16);
            if last_x > plot.x + first.len() as u16 {
                buf.set_string(last_x, axis_y, &last, muted);
            }
        }

        let mut x = plot.x;
        for entry in &chart.legend {
            let text = format!("■ {}  ", entry.label);
            let remaining = plot.right().saturating_sub(x) as usize;
            if remaining == 0 {
                break;
            }
            let style = Style::default().fg(terminal_color(entry.color));
            let (next_x, _) = buf.set_stringn(x, legend_y, &text, remaining, style);
            x = next_x;
        }
        let hint = format!("Vol axis 0-{:.0}", chart.layout.volume_axis_range[1]);
        let remaining = plot.right().saturating_sub(x) as usize;
        if remaining > hint.len() {
            buf.set_string(plot.right() - hint.len() as u16, legend_y, &hint, muted);
        }
    }
}
