//! Aggregate statistics over the whole signal table.
//!
//! Signal counts and the date range are computed. Outcome figures (win rate,
//! average return, win/loss counts) are not derivable from the sheet and come
//! from configuration, tagged as placeholders so no caller mistakes them for
//! a computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Table;

/// Where an outcome figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Fixed value supplied by configuration, not computed from outcomes.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeFigures {
    /// Percent, 0..=100.
    pub win_rate: Option<f64>,
    /// Percent.
    pub avg_return: Option<f64>,
    pub win_count: Option<u64>,
    pub loss_count: Option<u64>,
    pub provenance: Provenance,
}

pub const PLACEHOLDER_WIN_RATE: f64 = 87.15;

impl Default for OutcomeFigures {
    fn default() -> Self {
        Self {
            win_rate: Some(PLACEHOLDER_WIN_RATE),
            avg_return: None,
            win_count: None,
            loss_count: None,
            provenance: Provenance::Placeholder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Rows carrying at least one signal flag.
    pub total_signals: usize,
    /// Signalled rows on `latest_signal_date`.
    pub latest_day_signals: usize,
    pub latest_signal_date: Option<NaiveDate>,
    pub data_start: Option<NaiveDate>,
    pub data_end: Option<NaiveDate>,
    pub outcomes: OutcomeFigures,
}

impl SummaryStats {
    pub fn empty(outcomes: OutcomeFigures) -> Self {
        Self {
            total_signals: 0,
            latest_day_signals: 0,
            latest_signal_date: None,
            data_start: None,
            data_end: None,
            outcomes,
        }
    }
}

pub fn summary_stats(table: &Table, outcomes: &OutcomeFigures) -> SummaryStats {
    let mut stats = SummaryStats::empty(outcomes.clone());

    for row in &table.rows {
        stats.data_start = Some(stats.data_start.map_or(row.trade_date, |d| d.min(row.trade_date)));
        stats.data_end = Some(stats.data_end.map_or(row.trade_date, |d| d.max(row.trade_date)));

        if !row.has_any_signal() {
            continue;
        }
        stats.total_signals += 1;
        match stats.latest_signal_date {
            Some(d) if d > row.trade_date => {}
            Some(d) if d == row.trade_date => stats.latest_day_signals += 1,
            _ => {
                stats.latest_signal_date = Some(row.trade_date);
                stats.latest_day_signals = 1;
            }
        }
    }

    stats
}
