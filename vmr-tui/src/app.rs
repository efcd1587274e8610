//! Application state: single-owner, main-thread only.
//!
//! Views are pulled from `QueryService` at draw time. Its TTL caches keep
//! repeated draws from refetching or recomputing.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use vmr_core::chart::{ChartStyle, Palette};
use vmr_core::config::DisplaySection;
use vmr_core::query::{QueryService, Snapshot};
use vmr_core::telemetry::{Event, TelemetryQueue};

/// Which page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Observatory,
    Scanner,
}

impl Page {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        match self {
            Page::Observatory => 0,
            Page::Scanner => 1,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Page::Observatory),
            1 => Some(Page::Scanner),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Observatory => "Observatory",
            Page::Scanner => "Stock Scanner",
        }
    }

    /// Location reported with page views.
    pub fn location(self) -> &'static str {
        match self {
            Page::Observatory => "vmr://home",
            Page::Scanner => "vmr://scanner",
        }
    }

    pub fn next(self) -> Page {
        Page::from_index((self.index() + 1) % Self::COUNT).unwrap_or_default()
    }

    pub fn prev(self) -> Page {
        Page::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or_default()
    }
}

/// How long a degraded dashboard waits before asking the store again.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

pub struct AppState {
    pub running: bool,
    pub page: Page,
    pub service: QueryService,
    pub telemetry: TelemetryQueue,
    pub display: DisplaySection,
    /// Ticker list as of the last reload.
    pub tickers: Vec<String>,
    pub cursor: usize,
    pub chart_style: ChartStyle,
    pub show_help: bool,
    pub status_message: Option<(String, StatusLevel)>,
    /// Snapshot generation the ticker list was read from. 0 when degraded.
    pub generation: u64,
    /// Short content hash of that snapshot, for the status bar.
    pub fingerprint: Option<String>,
    last_load: Instant,
}

impl AppState {
    pub fn new(service: QueryService, telemetry: TelemetryQueue, display: DisplaySection) -> Self {
        let mut app = Self {
            running: true,
            page: Page::default(),
            service,
            telemetry,
            display,
            tickers: Vec::new(),
            cursor: 0,
            chart_style: ChartStyle::default(),
            show_help: false,
            status_message: None,
            generation: 0,
            fingerprint: None,
            last_load: Instant::now(),
        };
        app.reload_tickers();
        app
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Switch pages and report the page view.
    pub fn show_page(&mut self, page: Page) {
        self.page = page;
        self.track_page_view();
    }

    pub fn track_page_view(&self) {
        let mut event = Event::page_view(self.page.label(), self.page.location());
        if self.page == Page::Scanner {
            if let Some(ticker) = self.selected_ticker() {
                event = event.param("ticker", ticker);
            }
        }
        self.telemetry.track(event);
    }

    /// Re-read the ticker list, keeping the current selection when it survives.
    pub fn reload_tickers(&mut self) {
        let snap = self.service.snapshot();
        self.reload_from(snap);
    }

    /// Adopt an already fetched snapshot. One store call per load, even when
    /// the fetch failed.
    fn reload_from(&mut self, snap: Snapshot) {
        let previous = self.selected_ticker().map(str::to_string);
        self.last_load = Instant::now();
        self.tickers = vmr_core::query::ticker_list(&snap.table);
        self.cursor = previous
            .and_then(|t| self.tickers.iter().position(|x| *x == t))
            .unwrap_or(0);
        self.generation = snap.generation;
        self.fingerprint = (!snap.is_degraded()).then(|| {
            let mut hash = snap.table.fingerprint();
            hash.truncate(12);
            hash
        });

        if let Some(notice) = snap.notice {
            self.set_error(notice);
        }
    }

    /// True when the last load failed. Failed fetches are not cached, so
    /// pages must not query the service while degraded.
    pub fn is_degraded(&self) -> bool {
        self.generation == 0
    }

    /// Pick up a snapshot refreshed behind our back (TTL expiry), or retry a
    /// failed load every `RETRY_INTERVAL`.
    pub fn sync(&mut self) {
        if self.is_degraded() {
            if self.last_load.elapsed() >= RETRY_INTERVAL {
                self.reload_tickers();
            }
            return;
        }
        let snap = self.service.snapshot();
        if snap.generation != self.generation {
            tracing::debug!(from = self.generation, to = snap.generation, "snapshot changed");
            self.reload_from(snap);
        }
    }

    /// Retry a failed load now instead of waiting for `RETRY_INTERVAL`.
    /// A healthy snapshot is left alone until its TTL runs out.
    pub fn retry(&mut self) {
        if !self.is_degraded() {
            let ttl = self.service.settings().ttl.as_secs();
            let every = if ttl < 60 {
                format!("{ttl} s")
            } else {
                format!("{} min", ttl / 60)
            };
            self.set_status(format!("Data is live, refreshed every {every}"));
            return;
        }
        self.status_message = None;
        self.reload_tickers();
        if self.status_message.is_none() {
            self.set_status(format!("Loaded {} tickers", self.tickers.len()));
        }
    }

    pub fn selected_ticker(&self) -> Option<&str> {
        self.tickers.get(self.cursor).map(String::as_str)
    }

    /// Move the selection to `ticker`. Returns false when it is not listed.
    pub fn select_ticker(&mut self, ticker: &str) -> bool {
        match self.tickers.iter().position(|t| t == ticker) {
            Some(i) => {
                self.cursor = i;
                true
            }
            None => false,
        }
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.tickers.len() {
            self.cursor += 1;
            self.track_page_view();
        }
    }

    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.track_page_view();
        }
    }

    pub fn toggle_chart_style(&mut self) {
        self.chart_style = self.chart_style.toggle();
    }

    /// Line charts use the scanner palette; candlesticks the classic one.
    pub fn palette(&self) -> Palette {
        match self.chart_style {
            ChartStyle::Line => Palette::scanner(),
            ChartStyle::Candlestick => Palette::classic(),
        }
    }

    pub fn table_limit(&self) -> usize {
        match self.chart_style {
            ChartStyle::Line => self.display.scanner_table_limit,
            ChartStyle::Candlestick => self.display.classic_table_limit,
        }
    }
}
