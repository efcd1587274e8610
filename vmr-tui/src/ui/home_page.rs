//! Page 1: Observatory: HUD summary, strategy blurb, disclaimer.

use chrono::Datelike;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use vmr_core::query::SummaryStats;

use super::thousands;
use crate::app::AppState;
use crate::theme;

const BLURB: [&str; 2] = [
    "VMR (Volume-Momentum-Radar) is a volume and price momentum algorithm that flags \
     unusual buying pressure.",
    "This dashboard shows the historical signal record alongside live signals, so the \
     strategy can be judged on its track record.",
];

const HIGHLIGHTS: [(&str, &str); 3] = [
    ("Volume detection", "Reads volume, not just price, to catch large players entering."),
    ("Momentum confirmation", "Filters noise and only engages when momentum is strongest."),
    ("Historical validation", "Backed by more than five years of market data."),
];

const DISCLAIMER: &str = "For technical demonstration and research only. All figures are \
    historical back-test results or simulations, not investment advice. Markets carry \
    substantial risk and past performance does not predict future results.";

/// One HUD cell: label and formatted value.
#[derive(Debug, Clone, PartialEq)]
pub struct HudItem {
    pub label: &'static str,
    pub value: String,
    pub highlight: bool,
}

fn pct(value: Option<f64>, signed: bool) -> String {
    match value {
        Some(v) if signed => format!("{v:+.2}%"),
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

fn count(value: Option<u64>) -> String {
    value.map(thousands).unwrap_or_else(|| "n/a".to_string())
}

/// HUD contents in display order: two rows of three.
pub fn hud_items(stats: &SummaryStats) -> [HudItem; 6] {
    let range = match (stats.data_start, stats.data_end) {
        (Some(start), Some(end)) => format!("{}-{}", start.year(), end.year()),
        _ => "n/a".to_string(),
    };
    let latest = match stats.latest_signal_date {
        Some(date) => format!(
            "{} ({} on {})",
            thousands(stats.total_signals as u64),
            stats.latest_day_signals,
            date.format("%Y-%m-%d")
        ),
        None => thousands(stats.total_signals as u64),
    };
    let outcomes = &stats.outcomes;
    [
        HudItem { label: "DATA RANGE", value: range, highlight: false },
        HudItem { label: "WIN RATE", value: pct(outcomes.win_rate, false), highlight: true },
        HudItem { label: "AVG RETURN", value: pct(outcomes.avg_return, true), highlight: false },
        HudItem { label: "TOTAL SIGNALS", value: latest, highlight: false },
        HudItem { label: "WIN COUNT", value: count(outcomes.win_count), highlight: false },
        HudItem { label: "LOSS COUNT", value: count(outcomes.loss_count), highlight: false },
    ]
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let stats = if app.is_degraded() {
        SummaryStats::empty(app.service.settings().outcomes.clone())
    } else {
        app.service.summary_stats()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(8),
            Constraint::Min(6),
            Constraint::Length(5),
        ])
        .split(area);

    let heading = vec![
        Line::from(Span::styled(" System Dashboard", theme::accent_bold())),
        Line::from(Span::styled(" Demo & Trust Verification", theme::muted())),
    ];
    f.render_widget(Paragraph::new(heading), chunks[0]);

    render_hud(f, chunks[1], &hud_items(&stats));
    render_blurb(f, chunks[2]);

    let disclaimer = Paragraph::new(DISCLAIMER)
        .style(theme::muted())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::warning())
                .title(Span::styled(" Disclaimer ", theme::warning())),
        );
    f.render_widget(disclaimer, chunks[3]);
}

fn render_hud(f: &mut Frame, area: Rect, items: &[HudItem; 6]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(4)])
        .split(area);

    for (row_area, row_items) in rows.iter().zip(items.chunks(3)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(*row_area);
        for (cell, item) in cells.iter().zip(row_items) {
            let value_style = if item.highlight {
                theme::accent_bold()
            } else {
                theme::text().add_modifier(Modifier::BOLD)
            };
            let body = vec![
                Line::from(Span::styled(item.label, theme::muted())),
                Line::from(Span::styled(item.value.as_str(), value_style)),
            ];
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme::panel_border(item.highlight));
            f.render_widget(Paragraph::new(body).block(block), *cell);
        }
    }
}

fn render_blurb(f: &mut Frame, area: Rect) {
    let mut lines = vec![Line::from(Span::styled("What is VMR?", theme::accent_bold()))];
    lines.extend(BLURB.iter().map(|p| Line::from(*p)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Strategy Highlights", theme::accent_bold())));
    for (title, desc) in HIGHLIGHTS {
        lines.push(Line::from(vec![
            Span::styled(format!(" - {title}: "), theme::accent()),
            Span::raw(desc),
        ]));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
