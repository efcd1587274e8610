//! Page 2: Stock Scanner: ticker list, scorecards, signal chart, signal history.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table};
use ratatui::Frame;

use vmr_core::chart::{render_chart, render_table, TableSpec};
use vmr_core::query::{TickerInfo, NOT_AVAILABLE};

use crate::app::AppState;
use crate::panels::SignalChartPanel;
use crate::theme::{self, Theme};

const LIST_WIDTH: u16 = 14;

/// One scorecard: label, value, sub-label.
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    pub label: &'static str,
    pub value: String,
    pub sub: &'static str,
}

fn pct_or_na(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}%"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Two rows of four cards, in display order.
pub fn scorecards(info: &TickerInfo) -> [Scorecard; 8] {
    let latest = info
        .latest_price_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    [
        Scorecard { label: "Stock Name", value: info.name.clone(), sub: "name" },
        Scorecard { label: "Industry", value: info.industry.clone(), sub: "sector" },
        Scorecard { label: "Latest Price Date", value: latest, sub: "last trading day" },
        Scorecard {
            label: "Latest Close",
            value: info
                .latest_close
                .map(|c| format!("{c:.2}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            sub: "close",
        },
        Scorecard {
            label: "Tags in Past 2yrs",
            value: info.first_tag_count_2yr.to_string(),
            sub: "first signals",
        },
        Scorecard {
            label: "Win Rate (>5%)",
            value: pct_or_na(info.win_rate_5pct),
            sub: "rose >5% after signal",
        },
        Scorecard {
            label: "No Higher Price %",
            value: pct_or_na(info.no_higher_pct),
            sub: "never beat signal high",
        },
        Scorecard {
            label: "Tags in 5 Days",
            value: info.tags_in_5days.to_string(),
            sub: "last five trading days",
        },
    ]
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(20)])
        .split(area);

    render_ticker_list(f, columns[0], app);

    let Some(ticker) = app.selected_ticker() else {
        let msg = if app.is_degraded() {
            "No data. Press r to retry."
        } else {
            "Select a stock from the list to begin analysis."
        };
        f.render_widget(Paragraph::new(Span::styled(msg, theme::warning())), columns[1]);
        return;
    };

    let limit = app.table_limit();
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(10),
            Constraint::Length(limit.min(10) as u16 + 3),
        ])
        .split(columns[1]);

    let info = app.service.ticker_info(ticker);
    render_scorecards(f, body[0], &scorecards(&info));

    let series = app.service.series_for(ticker);
    let schema = app.service.snapshot().table.schema;
    let chart = render_chart(&series, schema, app.chart_style, &app.palette());
    let theme = Theme::default();
    f.render_widget(SignalChartPanel::new(&chart, ticker, &theme), body[1]);

    let table_schema = app.chart_style.signal_schema(schema);
    render_signal_table(f, body[2], &render_table(&series, table_schema, limit));
}

fn render_ticker_list(f: &mut Frame, area: Rect, app: &AppState) {
    let items: Vec<ListItem> = app
        .tickers
        .iter()
        .map(|t| ListItem::new(t.as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::panel_border(true))
                .title(format!(" Ticker ({}) ", app.tickers.len())),
        )
        .style(theme::text())
        .highlight_style(theme::accent().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.tickers.is_empty() {
        state.select(Some(app.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_scorecards(f: &mut Frame, area: Rect, cards: &[Scorecard; 8]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(4)])
        .split(area);

    for (row_area, row_cards) in rows.iter().zip(cards.chunks(4)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(*row_area);
        for (cell, card) in cells.iter().zip(row_cards) {
            let body = vec![
                Line::from(Span::styled(card.value.as_str(), theme::accent_bold())),
                Line::from(Span::styled(card.sub, theme::muted())),
            ];
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme::panel_border(false))
                .title(Span::styled(format!(" {} ", card.label), theme::text()));
            f.render_widget(Paragraph::new(body).block(block), *cell);
        }
    }
}

fn render_signal_table(f: &mut Frame, area: Rect, spec: &TableSpec) {
    let Some(table) = spec.table() else {
        f.render_widget(
            Paragraph::new(Span::styled("No data", theme::muted())).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Signal History "),
            ),
            area,
        );
        return;
    };

    let header = Row::new(table.columns.iter().map(|c| Cell::from(*c))).style(theme::accent_bold());
    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|r| {
            Row::new([
                Cell::from(r.date.format("%Y-%m-%d").to_string()),
                Cell::from(format!("{:.2}", r.open)),
                Cell::from(format!("{:.2}", r.high)),
                Cell::from(format!("{:.2}", r.low)),
                Cell::from(format!("{:.2}", r.close)),
            ])
        })
        .collect();

    let title = match table.kind {
        Some(kind) => format!(
            " Signal History: {} ({}/{}) ",
            kind.label(),
            table.rows.len(),
            table.total
        ),
        None => " Signal History: no signal columns ".to_string(),
    };
    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let widget = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::panel_border(false))
            .title(title),
    );
    f.render_widget(widget, area);
}
