//! Buffer-drawn widgets.

pub mod signal_chart;

pub use signal_chart::SignalChartPanel;
