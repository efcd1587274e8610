//! Row: one dated observation for one ticker, with its signal flags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The signal columns a dataset may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    /// `FIRST_SIGNAL`: first occurrence of a momentum event.
    First,
    /// `FOLLOWING_SIGNAL`: repeat occurrences after the first.
    Following,
    /// `SIGNAL`: generic flag used by older dataset versions.
    Generic,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [SignalKind::First, SignalKind::Following, SignalKind::Generic];

    /// Column name in the upstream sheet.
    pub fn column(self) -> &'static str {
        match self {
            SignalKind::First => "FIRST_SIGNAL",
            SignalKind::Following => "FOLLOWING_SIGNAL",
            SignalKind::Generic => "SIGNAL",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            SignalKind::First => "First Signal",
            SignalKind::Following => "Following Signal",
            SignalKind::Generic => "Signal",
        }
    }

    fn bit(self) -> u8 {
        match self {
            SignalKind::First => 0b001,
            SignalKind::Following => 0b010,
            SignalKind::Generic => 0b100,
        }
    }
}

/// Set of signal kinds active on a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalFlags(u8);

impl SignalFlags {
    pub const EMPTY: SignalFlags = SignalFlags(0);

    pub fn insert(&mut self, kind: SignalKind) {
        self.0 |= kind.bit();
    }

    pub fn with(mut self, kind: SignalKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn contains(self, kind: SignalKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SignalKind> {
        SignalKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }

    pub(crate) fn bits(self) -> u8 {
        self.0
    }
}

impl FromIterator<SignalKind> for SignalFlags {
    fn from_iter<I: IntoIterator<Item = SignalKind>>(iter: I) -> Self {
        iter.into_iter().fold(SignalFlags::EMPTY, SignalFlags::with)
    }
}

/// One observation. Numeric cells that were blank upstream are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub signal_flags: SignalFlags,
}

impl Row {
    pub fn has_signal(&self, kind: SignalKind) -> bool {
        self.signal_flags.contains(kind)
    }

    pub fn has_any_signal(&self) -> bool {
        !self.signal_flags.is_empty()
    }
}
