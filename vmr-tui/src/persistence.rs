//! App state persistence: JSON save/load across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vmr_core::chart::ChartStyle;

use crate::app::{AppState, Page};

const APP_DIR: &str = "vmr-observatory";

/// `<config dir>/vmr-observatory`, or the working directory when the
/// platform has no config dir.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn state_path() -> PathBuf {
    app_dir().join("state.json")
}

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub page: Page,
    pub ticker: Option<String>,
    pub chart_style: ChartStyle,
    /// Stable anonymous id reported with telemetry events.
    pub client_id: String,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            page: Page::Observatory,
            ticker: None,
            chart_style: ChartStyle::Line,
            client_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "corrupt state file, using defaults");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState, client_id: &str) -> PersistedState {
    PersistedState {
        page: app.page,
        ticker: app.selected_ticker().map(str::to_string),
        chart_style: app.chart_style,
        client_id: client_id.to_string(),
    }
}

/// Apply persisted state to AppState. A ticker that is no longer listed is ignored.
pub fn apply(app: &mut AppState, state: &PersistedState) {
    app.page = state.page;
    app.chart_style = state.chart_style;
    if let Some(ticker) = &state.ticker {
        app.select_ticker(ticker);
    }
}
