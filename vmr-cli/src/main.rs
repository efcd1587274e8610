//! VMR CLI: the dashboard's views on the command line.
//!
//! Commands:
//! - `tickers`: every ticker in the signal table, sorted
//! - `summary`: table-wide signal counts, date range and outcome figures
//! - `series`: one ticker's rows in date order
//! - `info`: one ticker's scorecard (JSON)
//! - `chart`: one ticker's chart spec (JSON)
//! - `signals`: one ticker's recent primary signals, as a table or CSV

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use vmr_core::cache::SystemClock;
use vmr_core::chart::{render_chart, render_table, ChartStyle, Palette, TableSpec};
use vmr_core::config::{self, DashboardConfig};
use vmr_core::domain::Row;
use vmr_core::query::{QueryService, Snapshot, SummaryStats};

#[derive(Parser)]
#[command(name = "vmr", version)]
#[command(about = "VMR Observatory CLI: read-only access to momentum signals", long_about = None)]
struct Cli {
    /// Config file path (falls back to $VMR_CONFIG, then vmr.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickers, one per line.
    Tickers,
    /// Table-wide summary.
    Summary {
        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// One ticker's rows in ascending date order.
    Series {
        ticker: String,

        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// One ticker's scorecard as JSON.
    Info { ticker: String },
    /// One ticker's chart spec as JSON.
    Chart {
        ticker: String,

        /// Line on HIGH, or OHLC candles with the classic palette.
        #[arg(long, value_enum, default_value_t = StyleArg::Line)]
        style: StyleArg,
    },
    /// One ticker's recent primary signals, newest first.
    Signals {
        ticker: String,

        /// Candlestick lists the legacy `SIGNAL` column when the sheet has it.
        #[arg(long, value_enum, default_value_t = StyleArg::Line)]
        style: StyleArg,

        /// Maximum rows. Defaults to the style's limit from config.
        #[arg(long)]
        limit: Option<usize>,

        /// Emit CSV instead of an aligned table.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Line,
    Candlestick,
}

impl From<StyleArg> for ChartStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Line => ChartStyle::Line,
            StyleArg::Candlestick => ChartStyle::Candlestick,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = config::resolve_path(cli.config.as_deref());
    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let source = config.build_source().context("building table source")?;
    let service = QueryService::new(source, config.query_settings(), Arc::new(SystemClock));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Tickers => {
            let snap = load(&service)?;
            for ticker in vmr_core::query::ticker_list(&snap.table) {
                writeln!(out, "{ticker}")?;
            }
        }
        Commands::Summary { json } => {
            load(&service)?;
            let stats = service.summary_stats();
            if json {
                write_json(&mut out, &stats)?;
            } else {
                write_summary(&mut out, &stats)?;
            }
        }
        Commands::Series { ticker, json } => {
            load(&service)?;
            let series = service.series_for(&ticker);
            if json {
                write_json(&mut out, series.as_slice())?;
            } else {
                write_series(&mut out, &series)?;
            }
        }
        Commands::Info { ticker } => {
            load(&service)?;
            write_json(&mut out, &service.ticker_info(&ticker))?;
        }
        Commands::Chart { ticker, style } => {
            let snap = load(&service)?;
            let style = ChartStyle::from(style);
            let palette = match style {
                ChartStyle::Line => Palette::scanner(),
                ChartStyle::Candlestick => Palette::classic(),
            };
            let spec = render_chart(&service.series_for(&ticker), snap.table.schema, style, &palette);
            write_json(&mut out, &spec)?;
        }
        Commands::Signals {
            ticker,
            style,
            limit,
            csv,
        } => {
            let snap = load(&service)?;
            let style = ChartStyle::from(style);
            let limit = limit.unwrap_or(match style {
                ChartStyle::Line => config.display.scanner_table_limit,
                ChartStyle::Candlestick => config.display.classic_table_limit,
            });
            let schema = style.signal_schema(snap.table.schema);
            let spec = render_table(&service.series_for(&ticker), schema, limit);
            if csv {
                write_signals_csv(&mut out, &spec)?;
            } else {
                write_signals(&mut out, &spec)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Current snapshot, or the store failure as an error.
fn load(service: &QueryService) -> Result<Snapshot> {
    let snap = service.snapshot();
    if let Some(notice) = &snap.notice {
        bail!("{notice}");
    }
    tracing::debug!(
        source = service.source_name(),
        generation = snap.generation,
        rows = snap.table.len(),
        skipped = snap.table.skipped_rows,
        "snapshot loaded"
    );
    Ok(snap)
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn opt_pct(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}%")).unwrap_or_else(|| "n/a".into())
}

fn opt_count(v: Option<u64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "n/a".into())
}

fn opt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "n/a".into())
}

fn write_summary<W: Write>(out: &mut W, stats: &SummaryStats) -> Result<()> {
    writeln!(out, "=== VMR Summary ===")?;
    writeln!(
        out,
        "Data range:     {} to {}",
        opt_date(stats.data_start),
        opt_date(stats.data_end)
    )?;
    writeln!(out, "Total signals:  {}", stats.total_signals)?;
    writeln!(
        out,
        "Latest signals: {} on {}",
        stats.latest_day_signals,
        opt_date(stats.latest_signal_date)
    )?;
    writeln!(out)?;
    writeln!(out, "Outcome figures (placeholder, not computed):")?;
    writeln!(out, "Win rate:       {}", opt_pct(stats.outcomes.win_rate))?;
    writeln!(out, "Avg return:     {}", opt_pct(stats.outcomes.avg_return))?;
    writeln!(out, "Win count:      {}", opt_count(stats.outcomes.win_count))?;
    writeln!(out, "Loss count:     {}", opt_count(stats.outcomes.loss_count))?;
    Ok(())
}

fn write_series<W: Write>(out: &mut W, series: &[Row]) -> Result<()> {
    if series.is_empty() {
        writeln!(out, "no data")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>14}  Signals",
        "Date", "Open", "High", "Low", "Close", "Volume"
    )?;
    for row in series {
        let signals: Vec<&str> = row.signal_flags.iter().map(|k| k.column()).collect();
        writeln!(
            out,
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14.0}  {}",
            row.trade_date,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
            signals.join(",")
        )?;
    }
    Ok(())
}

fn write_signals<W: Write>(out: &mut W, spec: &TableSpec) -> Result<()> {
    let Some(table) = spec.table() else {
        writeln!(out, "no data")?;
        return Ok(());
    };
    match table.kind {
        Some(kind) => writeln!(
            out,
            "{} rows ({} of {} shown)",
            kind.column(),
            table.rows.len(),
            table.total
        )?,
        None => writeln!(out, "no signal columns in this sheet")?,
    }
    let [date, open, high, low, close] = table.columns;
    writeln!(out, "{date:<10} {open:>10} {high:>10} {low:>10} {close:>10}")?;
    for row in &table.rows {
        writeln!(
            out,
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.date, row.open, row.high, row.low, row.close
        )?;
    }
    Ok(())
}

/// Header plus one record per row. Nothing at all for no data.
fn write_signals_csv<W: Write>(out: &mut W, spec: &TableSpec) -> Result<()> {
    let Some(table) = spec.table() else {
        return Ok(());
    };
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.columns)?;
    for row in &table.rows {
        writer.write_record([
            row.date.to_string(),
            row.open.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.close.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
