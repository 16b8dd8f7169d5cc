//! Export of backtest results: JSON, CSV, and a Markdown summary.
//!
//! - **JSON**: full `BacktestResult` with a `schema_version` field; newer
//!   versions are rejected on import.
//! - **CSV**: trade ledger and equity curve, one row per record, via
//!   `csv::Writer::serialize`.
//! - **Markdown**: a human-readable single-run report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use quantlab_core::domain::{EquityPoint, TradeRecord};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (max supported: {supported})")]
    SchemaVersion { found: u32, supported: u32 },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(result: &BacktestResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Deserialize a `BacktestResult`, rejecting schema versions newer than ours.
pub fn import_json(json: &str) -> Result<BacktestResult, ExportError> {
    let result: BacktestResult = serde_json::from_str(json)?;
    if result.schema_version > SCHEMA_VERSION {
        return Err(ExportError::SchemaVersion {
            found: result.schema_version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

fn to_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let data = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Trade ledger as CSV, one row per closed trade.
///
/// Columns follow `TradeRecord` field order: entry_date, entry_price,
/// exit_date, exit_price, shares, pnl, pnl_pct, holding_days, entry_bar,
/// exit_bar, bars_held, gross_pnl, costs.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String, ExportError> {
    if trades.is_empty() {
        // csv writes no header for an empty record set.
        return Ok("entry_date,entry_price,exit_date,exit_price,shares,pnl,pnl_pct,holding_days,\
entry_bar,exit_bar,bars_held,gross_pnl,costs\n"
            .to_string());
    }
    to_csv(trades)
}

/// Equity curve as CSV: date, cash, position_value, equity, close.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String, ExportError> {
    if equity_curve.is_empty() {
        return Ok("date,cash,position_value,equity,close\n".to_string());
    }
    to_csv(equity_curve)
}

// ─── Files ──────────────────────────────────────────────────────────

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, content).map_err(io_error(path))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote export file.");
    Ok(())
}

pub fn write_json(result: &BacktestResult, path: &Path) -> Result<(), ExportError> {
    write_file(path, &export_json(result)?)
}

pub fn write_trades_csv(trades: &[TradeRecord], path: &Path) -> Result<(), ExportError> {
    write_file(path, &export_trades_csv(trades)?)
}

pub fn write_equity_csv(equity_curve: &[EquityPoint], path: &Path) -> Result<(), ExportError> {
    write_file(path, &export_equity_csv(equity_curve)?)
}

/// Write `result.json`, `trades.csv`, `equity.csv` and `report.md` into
/// `{output_dir}/{symbol}_{strategy}/`. Returns the run directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let run_dir = output_dir.join(format!("{}_{}", result.symbol, result.strategy));
    write_json(result, &run_dir.join("result.json"))?;
    write_trades_csv(&result.trades, &run_dir.join("trades.csv"))?;
    write_equity_csv(&result.equity_curve, &run_dir.join("equity.csv"))?;
    write_file(&run_dir.join("report.md"), &generate_report(result))?;
    tracing::info!(dir = %run_dir.display(), trades = result.trades.len(), "Saved backtest artifacts.");
    Ok(run_dir)
}

pub fn load_artifacts(dir: &Path) -> Result<BacktestResult, ExportError> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path).map_err(io_error(&path))?;
    import_json(&json)
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Render an optional ratio, `N/A` when undefined.
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}

/// Render an optional fraction as a percentage, `N/A` when undefined.
pub fn fmt_opt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);
    md.push_str("# Backtest Report\n\n");

    md.push_str("## Run\n\n| Field | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", result.symbol));
    md.push_str(&format!("| Period | {} to {} |\n", result.start_date, result.end_date));
    md.push_str(&format!("| Strategy | {} |\n", result.strategy));
    let params: Vec<String> = result.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    md.push_str(&format!("| Params | {} |\n", params.join(", ")));
    md.push_str(&format!("| Initial Capital | {:.2} |\n", result.initial_capital));
    md.push_str(&format!("| Bars | {} ({} warmup) |\n", result.bar_count, result.warmup_bars));
    md.push_str(&format!("| Dataset Hash | {} |\n\n", result.dataset_hash));

    let m = &result.metrics;
    md.push_str("## Performance\n\n| Metric | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Total Return | {:.2}% |\n", m.total_return * 100.0));
    md.push_str(&format!("| Annualized Return | {:.2}% |\n", m.annualized_return * 100.0));
    md.push_str(&format!("| Annualized Volatility | {:.2}% |\n", m.annualized_volatility * 100.0));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", m.max_drawdown * 100.0));
    md.push_str(&format!("| Sharpe | {} |\n", fmt_opt(m.sharpe, 3)));
    md.push_str(&format!("| Sortino | {} |\n", fmt_opt(m.sortino, 3)));
    md.push_str(&format!("| Calmar | {} |\n", fmt_opt(m.calmar, 3)));
    md.push_str(&format!("| Win Rate | {} |\n", fmt_opt_pct(m.win_rate)));
    md.push_str(&format!("| Profit Factor | {} |\n", fmt_opt(m.profit_factor, 2)));
    md.push_str(&format!("| Avg Win | {} |\n", fmt_opt(m.avg_win, 2)));
    md.push_str(&format!("| Avg Loss | {} |\n", fmt_opt(m.avg_loss, 2)));
    md.push_str(&format!("| Avg Holding Days | {} |\n", fmt_opt(m.avg_holding_days, 1)));
    md.push_str(&format!(
        "| Trades | {} ({} won, {} lost) |\n",
        m.trade_count, m.winning_trades, m.losing_trades
    ));
    md.push_str(&format!("| Max Consecutive Wins | {} |\n", m.max_consecutive_wins));
    md.push_str(&format!("| Max Consecutive Losses | {} |\n", m.max_consecutive_losses));
    md.push_str(&format!("| Final Equity | {:.2} |\n", m.final_equity));

    if let Some(pos) = &result.open_position {
        md.push_str(&format!(
            "\nOpen position: {} shares since {} at {:.2}.\n",
            pos.shares, pos.entry_date, pos.entry_price
        ));
    }
    if result.skipped_entries > 0 {
        md.push_str(&format!(
            "\n{} entry signal(s) skipped for insufficient cash.\n",
            result.skipped_entries
        ));
    }
    md
}
