//! Dashboard configuration.
//!
//! One TOML file (`vmr.toml` by default) laid out like the deployment
//! secrets: sheet location, service-account key, analytics credentials, plus
//! cache, display and scorecard settings. A missing file yields defaults,
//! which read an offline CSV export.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::data::{
    CsvSource, ServiceAccountKey, SheetsConfig, SheetsSource, StoreError, TableSource,
};
use crate::domain::TickerProfile;
use crate::query::{OutcomeFigures, Provenance, QuerySettings, ScorecardParams};
use crate::telemetry::{Ga4Sink, TelemetryQueue, DEFAULT_CAPACITY};

pub const DEFAULT_CONFIG_FILE: &str = "vmr.toml";
pub const CONFIG_ENV: &str = "VMR_CONFIG";
pub const DEFAULT_CSV_PATH: &str = "data/vmr.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing [{0}] section")]
    Missing(&'static str),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceChoice {
    Sheets,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Unset means Sheets when `[gsheet]` exists, otherwise CSV.
    pub kind: Option<SourceChoice>,
    pub path: PathBuf,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: None,
            path: PathBuf::from(DEFAULT_CSV_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GsheetSection {
    pub spreadsheet_id: String,
    pub worksheet: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ga4Section {
    pub measurement_id: Option<String>,
    pub api_secret: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { ttl_secs: 600 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub scanner_table_limit: usize,
    pub classic_table_limit: usize,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            scanner_table_limit: crate::chart::SCANNER_LIMIT,
            classic_table_limit: crate::chart::CLASSIC_LIMIT,
        }
    }
}

/// Outcome figures shown on the home page. Not computed from data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaceholderSection {
    pub win_rate: Option<f64>,
    pub avg_return: Option<f64>,
    pub win_count: Option<u64>,
    pub loss_count: Option<u64>,
}

impl Default for PlaceholderSection {
    fn default() -> Self {
        let figures = OutcomeFigures::default();
        Self {
            win_rate: figures.win_rate,
            avg_return: figures.avg_return,
            win_count: figures.win_count,
            loss_count: figures.loss_count,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceSection,
    pub gsheet: Option<GsheetSection>,
    pub gcp_service_account: Option<ServiceAccountKey>,
    pub ga4: Option<Ga4Section>,
    pub cache: CacheSection,
    pub display: DisplaySection,
    pub scorecard: ScorecardParams,
    pub placeholder: PlaceholderSection,
    pub tickers: BTreeMap<String, TickerProfile>,
}

/// `--config` wins, then `VMR_CONFIG`, then `vmr.toml`.
pub fn resolve_path(cli: Option<&Path>) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

impl DashboardConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache.ttl_secs must be positive".into()));
        }
        if self.display.scanner_table_limit == 0 || self.display.classic_table_limit == 0 {
            return Err(ConfigError::Invalid("display table limits must be positive".into()));
        }
        if self.scorecard.outcome_horizon_days == 0 {
            return Err(ConfigError::Invalid(
                "scorecard.outcome_horizon_days must be positive".into(),
            ));
        }
        if !self.scorecard.win_threshold_pct.is_finite() {
            return Err(ConfigError::Invalid(
                "scorecard.win_threshold_pct must be a number".into(),
            ));
        }
        Ok(())
    }

    pub fn source_choice(&self) -> SourceChoice {
        self.source.kind.unwrap_or(if self.gsheet.is_some() {
            SourceChoice::Sheets
        } else {
            SourceChoice::Csv
        })
    }

    pub fn build_source(&self) -> Result<Box<dyn TableSource>, ConfigError> {
        match self.source_choice() {
            SourceChoice::Csv => Ok(Box::new(CsvSource::new(&self.source.path))),
            SourceChoice::Sheets => {
                let gsheet = self.gsheet.as_ref().ok_or(ConfigError::Missing("gsheet"))?;
                let key = self
                    .gcp_service_account
                    .clone()
                    .ok_or(ConfigError::Missing("gcp_service_account"))?;
                let mut sheets = SheetsConfig::new(&gsheet.spreadsheet_id);
                sheets.worksheet = gsheet.worksheet.clone();
                if let Some(base) = &gsheet.api_base {
                    sheets.api_base = base.clone();
                }
                Ok(Box::new(SheetsSource::new(sheets, key)?))
            }
        }
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            outcomes: OutcomeFigures {
                win_rate: self.placeholder.win_rate,
                avg_return: self.placeholder.avg_return,
                win_count: self.placeholder.win_count,
                loss_count: self.placeholder.loss_count,
                provenance: Provenance::Placeholder,
            },
            scorecard: self.scorecard,
            directory: self.tickers.clone(),
        }
    }

    /// Start telemetry when both GA4 secrets are present. Anything else,
    /// including a failure to start, yields a disabled queue.
    pub fn telemetry(&self, client_id: &str) -> TelemetryQueue {
        let Some(ga4) = &self.ga4 else {
            return TelemetryQueue::disabled();
        };
        let (Some(id), Some(secret)) = (
            ga4.measurement_id.as_deref().filter(|s| !s.is_empty()),
            ga4.api_secret.as_deref().filter(|s| !s.is_empty()),
        ) else {
            tracing::debug!("ga4 credentials incomplete, telemetry disabled");
            return TelemetryQueue::disabled();
        };

        let started = Ga4Sink::new(id, secret, client_id).and_then(|sink| {
            let sink = match &ga4.endpoint {
                Some(endpoint) => sink.with_endpoint(endpoint),
                None => sink,
            };
            TelemetryQueue::start(Box::new(sink), DEFAULT_CAPACITY)
        });
        match started {
            Ok(queue) => queue,
            Err(e) => {
                tracing::debug!(error = %e, "telemetry disabled");
                TelemetryQueue::disabled()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        let config = DashboardConfig::from_toml("", Path::new("vmr.toml")).unwrap();
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.display.scanner_table_limit, 10);
        assert_eq!(config.display.classic_table_limit, 20);
        assert_eq!(config.placeholder.win_rate, Some(87.15));
        assert_eq!(config.scorecard.outcome_horizon_days, 20);
        assert_eq!(config.source_choice(), SourceChoice::Csv);
        assert_eq!(config.source.path, PathBuf::from(DEFAULT_CSV_PATH));
    }

    #[test]
    fn gsheet_section_implies_sheets_source() {
        let toml = r#"
            [gsheet]
            spreadsheet_id = "abc123"

            [placeholder]
            avg_return = 3.2

            [tickers."2330"]
            name = "TSMC"
            industry = "Semiconductors"
        "#;
        let config = DashboardConfig::from_toml(toml, Path::new("vmr.toml")).unwrap();
        assert_eq!(config.source_choice(), SourceChoice::Sheets);
        assert_eq!(config.placeholder.avg_return, Some(3.2));
        assert_eq!(config.placeholder.win_rate, Some(87.15));
        assert_eq!(config.tickers["2330"].industry.as_deref(), Some("Semiconductors"));

        let err = config.build_source().err().unwrap();
        assert!(matches!(err, ConfigError::Missing("gcp_service_account")));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = DashboardConfig::from_toml("[cache]\nttl_secs = 0", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_toml_reports_path() {
        let err = DashboardConfig::from_toml("[cache\n", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.cache.ttl_secs, 600);
    }

    #[test]
    fn incomplete_ga4_disables_telemetry() {
        let toml = "[ga4]\nmeasurement_id = \"G-TEST\"\n";
        let config = DashboardConfig::from_toml(toml, Path::new("vmr.toml")).unwrap();
        assert!(!config.telemetry("client").is_enabled());
    }

    #[test]
    fn query_settings_carry_placeholders() {
        let config = DashboardConfig::default();
        let settings = config.query_settings();
        assert_eq!(settings.ttl, Duration::from_secs(600));
        assert_eq!(settings.outcomes.provenance, Provenance::Placeholder);
        assert_eq!(settings.outcomes.win_rate, Some(87.15));
    }
}
