//! Presentation layer: chart and table specifications.

pub mod palette;
pub mod spec;
pub mod table;

pub use palette::{Palette, Rgba, SignalColors};
pub use spec::{
    render_chart, volume_axis_range, volume_colors, Chart, ChartSpec, ChartStyle, LegendMarker,
    PriceTrace, SignalMarker,
};
pub use table::{render_table, SignalRow, SignalTable, TableSpec, CLASSIC_LIMIT, SCANNER_LIMIT};
