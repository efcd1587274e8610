//! Query layer: derived views over the signal table, behind a TTL cache.
//!
//! The free functions are pure over a `Table`. `QueryService` owns the
//! source and the caches and is the only thing the front ends talk to.

pub mod summary;
pub mod ticker_info;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::{Clock, TtlCache};
use crate::data::{SourceKind, StoreError, TableSource};
use crate::domain::{Row, Table, TickerProfile};

pub use summary::{summary_stats, OutcomeFigures, Provenance, SummaryStats};
pub use ticker_info::{ticker_info, ScorecardParams, TickerInfo, NOT_AVAILABLE};

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Distinct tickers, ascending. Empty when the sheet has no ticker column.
pub fn ticker_list(table: &Table) -> Vec<String> {
    if !table.has_ticker_column {
        return Vec::new();
    }
    table
        .rows
        .iter()
        .map(|r| r.ticker.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Rows for `ticker`, ascending by trade date. Empty for unknown tickers.
pub fn series_for(table: &Table, ticker: &str) -> Vec<Row> {
    let mut rows: Vec<Row> = table
        .rows
        .iter()
        .filter(|r| r.ticker == ticker)
        .cloned()
        .collect();
    rows.sort_by_key(|r| r.trade_date);
    rows
}

/// One view of the table as of a fetch.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Arc<Table>,
    pub fetched_at: DateTime<Utc>,
    /// Increments on each successful fetch. Zero for a failed fetch.
    pub generation: u64,
    /// User-facing message when the fetch failed.
    pub notice: Option<String>,
}

impl Snapshot {
    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }
}

/// Everything the service needs besides the source and the clock.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub ttl: Duration,
    pub outcomes: OutcomeFigures,
    pub scorecard: ScorecardParams,
    pub directory: BTreeMap<String, TickerProfile>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            outcomes: OutcomeFigures::default(),
            scorecard: ScorecardParams::default(),
            directory: BTreeMap::new(),
        }
    }
}

pub struct QueryService {
    source: Box<dyn TableSource>,
    settings: QuerySettings,
    generation: AtomicU64,
    table: TtlCache<(), Snapshot>,
    summaries: TtlCache<u64, SummaryStats>,
    series: TtlCache<(u64, String), Arc<Vec<Row>>>,
    infos: TtlCache<(u64, String), TickerInfo>,
}

impl QueryService {
    pub fn new(source: Box<dyn TableSource>, settings: QuerySettings, clock: Arc<dyn Clock>) -> Self {
        let ttl = settings.ttl;
        Self {
            source,
            settings,
            generation: AtomicU64::new(0),
            table: TtlCache::new(ttl, clock.clone()),
            summaries: TtlCache::new(ttl, clock.clone()),
            series: TtlCache::new(ttl, clock.clone()),
            infos: TtlCache::new(ttl, clock),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Current table, fetched at most once per TTL window.
    ///
    /// A failed fetch is not cached. It yields an empty table with `notice`
    /// set, and the next call tries the store again.
    pub fn snapshot(&self) -> Snapshot {
        let fetched = self.table.get_or_try_insert_with((), || {
            let table = self.source.fetch_all()?;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            // Derived views never outlive the table they came from.
            self.summaries.clear();
            self.series.clear();
            self.infos.clear();
            tracing::info!(
                source = self.source.name(),
                generation,
                rows = table.len(),
                fingerprint = %table.fingerprint(),
                "table snapshot refreshed"
            );
            Ok::<_, StoreError>(Snapshot {
                table: Arc::new(table),
                fetched_at: Utc::now(),
                generation,
                notice: None,
            })
        });

        fetched.unwrap_or_else(|err| {
            tracing::error!(source = self.source.name(), error = %err, "table fetch failed");
            Snapshot {
                table: Arc::new(Table::empty()),
                fetched_at: Utc::now(),
                generation: 0,
                notice: Some(format!("Unable to load data: {err}")),
            }
        })
    }

    /// Forget the cached table. The next view fetches from the store.
    pub fn invalidate(&self) {
        self.table.clear();
    }

    pub fn ticker_list(&self) -> Vec<String> {
        ticker_list(&self.snapshot().table)
    }

    pub fn series_for(&self, ticker: &str) -> Arc<Vec<Row>> {
        let snap = self.snapshot();
        if snap.is_degraded() {
            return Arc::new(Vec::new());
        }
        let key = (snap.generation, ticker.to_string());
        self.series
            .get_or_try_insert_with(key, || {
                Ok::<_, std::convert::Infallible>(Arc::new(series_for(&snap.table, ticker)))
            })
            .unwrap_or_else(|never| match never {})
    }

    pub fn summary_stats(&self) -> SummaryStats {
        let snap = self.snapshot();
        if snap.is_degraded() {
            return SummaryStats::empty(self.settings.outcomes.clone());
        }
        self.summaries
            .get_or_try_insert_with(snap.generation, || {
                Ok::<_, std::convert::Infallible>(summary_stats(&snap.table, &self.settings.outcomes))
            })
            .unwrap_or_else(|never| match never {})
    }

    pub fn ticker_info(&self, ticker: &str) -> TickerInfo {
        let snap = self.snapshot();
        let compute = || {
            ticker_info(
                &snap.table,
                ticker,
                &self.settings.directory,
                &self.settings.scorecard,
            )
        };
        if snap.is_degraded() {
            return compute();
        }
        self.infos
            .get_or_try_insert_with((snap.generation, ticker.to_string()), || {
                Ok::<_, std::convert::Infallible>(compute())
            })
            .unwrap_or_else(|never| match never {})
    }
}
