//! QuantLab CLI: backtests, composite signals, risk and price targets.
//!
//! Commands:
//! - `backtest` runs one strategy from flags or a TOML config file
//! - `signal` scores the last bar (one or all risk tolerances)
//! - `risk` estimates volatility, forward ranges and tail risk
//! - `targets` computes bullish/bearish price targets
//! - `report` combines direction, risk, signal and a recommendation
//! - `indicators` prints the standard indicator set for the last bars
//! - `strategies` lists strategy ids and parameter schemas
//! - `sweep` runs a parameter grid in parallel
//!
//! Bars come from `--csv <file>` or `--synthetic <symbol>`.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::prelude::*;

use quantlab_core::domain::Bar;
use quantlab_core::risk::{estimate_price_targets, estimate_risk, PriceTargets, RiskConfig, RiskEstimate};
use quantlab_core::signal::{score_composite, CompositeReport, RiskTolerance, SignalConfig};
use quantlab_core::{compute_indicators, strategy_catalog, IndicatorParams, SimulatorConfig};
use quantlab_runner::batch::{BatchRunner, ParamGrid, RankMetric};
use quantlab_runner::data_loader::{generate_synthetic, load_csv, LoadOptions, SyntheticSpec};
use quantlab_runner::export::{fmt_opt, fmt_opt_pct, save_artifacts, write_equity_csv, write_trades_csv};
use quantlab_runner::report::{comprehensive_report_with, ComprehensiveReport};
use quantlab_runner::runner::{run_backtest, BacktestRequest, BacktestResult};
use quantlab_runner::BacktestConfig;

#[derive(Parser)]
#[command(name = "quantlab", about = "QuantLab: equity signal engine and strategy backtester")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct DataArgs {
    /// CSV file with a date,open,high,low,close,volume header.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Generate a deterministic synthetic series for this symbol.
    #[arg(long, value_name = "SYMBOL")]
    synthetic: Option<String>,

    /// Synthetic series length.
    #[arg(long, default_value_t = 750)]
    bars: usize,

    /// Synthetic series seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Symbol tag for CSV bars (defaults to the file stem).
    #[arg(long)]
    symbol: Option<String>,

    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    end: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest for one strategy.
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        /// TOML config file; command-line flags override its strategy.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy id (see `quantlab strategies`).
        #[arg(long)]
        strategy: Option<String>,

        /// Strategy parameter as name=value; repeatable.
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        #[arg(long)]
        capital: Option<f64>,

        /// Commission as a fraction of notional per leg.
        #[arg(long)]
        commission: Option<f64>,

        /// Slippage as a fraction of notional per leg.
        #[arg(long)]
        slippage: Option<f64>,

        /// Close any open position at the last bar.
        #[arg(long, default_value_t = false)]
        liquidate: bool,

        /// Annual risk-free rate for Sharpe and Sortino.
        #[arg(long)]
        risk_free: Option<f64>,

        /// Save result.json, trades.csv, equity.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(long)]
        trades_csv: Option<PathBuf>,

        #[arg(long)]
        equity_csv: Option<PathBuf>,

        /// Print the full result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Composite direction and trading signal for the last bar.
    Signal {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value = "moderate")]
        tolerance: String,

        /// Score under every risk tolerance.
        #[arg(long, default_value_t = false)]
        all_tolerances: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Volatility, forward price ranges and tail risk.
    Risk {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = 5)]
        forward_days: usize,

        /// Confidence levels for price ranges; repeatable.
        #[arg(long = "level")]
        levels: Vec<f64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Price targets from bands, pivots, Fibonacci levels and trend.
    Targets {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = 5)]
        forward_days: usize,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Direction, risk, signal and recommendation in one report.
    Report {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = 5)]
        forward_days: usize,

        #[arg(long, default_value = "moderate")]
        tolerance: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Standard indicator values for the last bars.
    Indicators {
        #[command(flatten)]
        data: DataArgs,

        /// Number of trailing bars to print.
        #[arg(long, default_value_t = 5)]
        last: usize,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List strategies and their parameters.
    Strategies {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parallel parameter sweep for one strategy.
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value = "ma_cross")]
        strategy: String,

        /// Grid axis as name=v1,v2,...; repeatable. Defaults to the ma_cross grid.
        #[arg(long = "grid", value_name = "NAME=V1,V2")]
        axes: Vec<String>,

        /// sharpe, total_return, calmar or sortino.
        #[arg(long, default_value = "sharpe")]
        rank: String,

        #[arg(long, default_value_t = 10)]
        top: usize,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level));
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Backtest {
            data,
            config,
            strategy,
            params,
            capital,
            commission,
            slippage,
            liquidate,
            risk_free,
            output_dir,
            trades_csv,
            equity_csv,
            json,
        } => {
            let config = config.map(|p| BacktestConfig::from_file(&p)).transpose()?;
            let bars = load_bars(&data, config.as_ref())?;

            let mut request = match &config {
                Some(c) => c.to_request(),
                None => BacktestRequest::new("ma_cross"),
            };
            if let Some(id) = strategy {
                request.strategy = id;
                request.params.clear();
            }
            request.params.extend(parse_params(&params)?);
            apply_simulator_flags(&mut request.simulator, capital, commission, slippage, liquidate);
            if let Some(rf) = risk_free {
                request.risk_free_rate = rf;
            }

            let result = run_backtest(&bars, &request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_backtest(&result);
            }
            if let Some(path) = trades_csv {
                write_trades_csv(&result.trades, &path)?;
                eprintln!("Trades written to: {}", path.display());
            }
            if let Some(path) = equity_csv {
                write_equity_csv(&result.equity_curve, &path)?;
                eprintln!("Equity curve written to: {}", path.display());
            }
            if let Some(dir) = output_dir {
                let run_dir = save_artifacts(&result, &dir)?;
                eprintln!("Artifacts saved to: {}", run_dir.display());
            }
            Ok(())
        }
        Commands::Signal {
            data,
            tolerance,
            all_tolerances,
            json,
        } => {
            let bars = load_bars(&data, None)?;
            let reports: Vec<(RiskTolerance, CompositeReport)> = if all_tolerances {
                BatchRunner::default().signals_all_tolerances(&bars, &SignalConfig::default())?
            } else {
                let tolerance: RiskTolerance = tolerance.parse()?;
                let config = SignalConfig::with_tolerance(tolerance);
                let indicators = compute_indicators(&bars, &config.indicators)?;
                vec![(tolerance, score_composite(&bars, &indicators, &config)?)]
            };
            if json {
                let out: Vec<&CompositeReport> = reports.iter().map(|(_, r)| r).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for (_, report) in &reports {
                    print_signal(report);
                }
            }
            Ok(())
        }
        Commands::Risk {
            data,
            forward_days,
            levels,
            json,
        } => {
            let bars = load_bars(&data, None)?;
            let mut config = RiskConfig::with_forward_days(forward_days);
            if !levels.is_empty() {
                config.confidence_levels = levels;
            }
            let risk = estimate_risk(&bars, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&risk)?);
            } else {
                print_risk(&risk);
            }
            Ok(())
        }
        Commands::Targets {
            data,
            forward_days,
            json,
        } => {
            let bars = load_bars(&data, None)?;
            let targets = estimate_price_targets(&bars, forward_days)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&targets)?);
            } else {
                print_targets(&targets);
            }
            Ok(())
        }
        Commands::Report {
            data,
            forward_days,
            tolerance,
            json,
        } => {
            let bars = load_bars(&data, None)?;
            let tolerance: RiskTolerance = tolerance.parse()?;
            let report = comprehensive_report_with(
                &bars,
                &SignalConfig::with_tolerance(tolerance),
                &RiskConfig::with_forward_days(forward_days),
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Commands::Indicators { data, last, json } => {
            let bars = load_bars(&data, None)?;
            print_indicators(&bars, last, json)
        }
        Commands::Strategies { json } => {
            let catalog = strategy_catalog();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
                return Ok(());
            }
            for info in catalog {
                println!("{:<10} {}", info.id, info.description);
                for p in info.params {
                    println!(
                        "    {:<11} default {:<6} range [{}, {}]  {}",
                        p.name, p.default, p.min, p.max, p.description
                    );
                }
            }
            Ok(())
        }
        Commands::Sweep {
            data,
            strategy,
            axes,
            rank,
            top,
            json,
        } => {
            let bars = load_bars(&data, None)?;
            let grid = if axes.is_empty() && strategy == "ma_cross" {
                ParamGrid::ma_cross_default()
            } else {
                parse_grid(&strategy, &axes)?
            };
            let rank: RankMetric = rank.parse().map_err(anyhow::Error::msg)?;
            let results = BatchRunner::default().sweep(&bars, &grid, &BacktestRequest::new(&strategy))?;
            let best = results.top_n(rank, top);
            if json {
                println!("{}", serde_json::to_string_pretty(&best)?);
            } else {
                print_sweep(&best, results.len());
            }
            Ok(())
        }
    }
}

// ─── Input ──────────────────────────────────────────────────────────

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'")))
        .transpose()
}

/// Bars from CLI flags, falling back to the config's `[data]` section.
fn load_bars(data: &DataArgs, config: Option<&BacktestConfig>) -> Result<Vec<Bar>> {
    let opts = LoadOptions {
        symbol: data.symbol.clone(),
        start: parse_date(data.start.as_deref())?,
        end: parse_date(data.end.as_deref())?,
    };

    if let Some(path) = &data.csv {
        return load_csv(path, &opts).with_context(|| format!("loading {}", path.display()));
    }
    if let Some(symbol) = &data.synthetic {
        return Ok(generate_synthetic(&SyntheticSpec::new(symbol.clone(), data.bars, data.seed))?);
    }
    if let Some(section) = config.map(|c| &c.data) {
        if let Some(path) = &section.csv {
            let opts = LoadOptions {
                symbol: opts.symbol.or_else(|| section.symbol.clone()),
                ..opts
            };
            return load_csv(path, &opts).with_context(|| format!("loading {}", path.display()));
        }
        if let Some(synth) = &section.synthetic {
            return Ok(generate_synthetic(&synth.to_spec())?);
        }
    }
    bail!("no input: pass --csv <file> or --synthetic <symbol>")
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .with_context(|| format!("expected NAME=VALUE, got '{raw}'"))
}

fn parse_params(raw: &[String]) -> Result<HashMap<String, f64>> {
    raw.iter()
        .map(|p| {
            let (name, value) = split_pair(p)?;
            let value: f64 = value.parse().with_context(|| format!("invalid value in '{p}'"))?;
            Ok((name.to_string(), value))
        })
        .collect()
}

fn parse_grid(strategy: &str, raw: &[String]) -> Result<ParamGrid> {
    let mut grid = ParamGrid::new(strategy);
    for axis in raw {
        let (name, values) = split_pair(axis)?;
        let values = values
            .split(',')
            .map(|v| v.trim().parse::<f64>().with_context(|| format!("invalid value in '{axis}'")))
            .collect::<Result<Vec<_>>>()?;
        grid = grid.axis(name, values);
    }
    Ok(grid)
}

fn apply_simulator_flags(
    sim: &mut SimulatorConfig,
    capital: Option<f64>,
    commission: Option<f64>,
    slippage: Option<f64>,
    liquidate: bool,
) {
    if let Some(c) = capital {
        sim.initial_capital = c;
    }
    if let Some(c) = commission {
        sim.commission_rate = c;
    }
    if let Some(s) = slippage {
        sim.slippage_rate = s;
    }
    sim.liquidate_at_end |= liquidate;
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_backtest(result: &BacktestResult) {
    let m = &result.metrics;
    println!("=== Backtest Results ===");
    println!("Symbol:         {}", result.symbol);
    println!("Period:         {} to {}", result.start_date, result.end_date);
    let params: Vec<String> = result.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    println!("Strategy:       {} ({})", result.strategy, params.join(", "));
    println!("Bars:           {} ({} warmup)", result.bar_count, result.warmup_bars);
    println!();
    println!("Total Return:   {:.2}%", m.total_return * 100.0);
    println!("Annualized:     {:.2}%", m.annualized_return * 100.0);
    println!("Volatility:     {:.2}%", m.annualized_volatility * 100.0);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown * 100.0);
    println!("Sharpe:         {}", fmt_opt(m.sharpe, 3));
    println!("Sortino:        {}", fmt_opt(m.sortino, 3));
    println!("Calmar:         {}", fmt_opt(m.calmar, 3));
    println!("Win Rate:       {}", fmt_opt_pct(m.win_rate));
    println!("Profit Factor:  {}", fmt_opt(m.profit_factor, 2));
    println!("Avg Trade PnL:  {}", fmt_opt(m.avg_trade_pnl, 2));
    println!("Avg Holding:    {} days", fmt_opt(m.avg_holding_days, 1));
    println!(
        "Trades:         {} ({} won, {} lost)",
        m.trade_count, m.winning_trades, m.losing_trades
    );
    println!("Final Equity:   {:.2}", m.final_equity);
    if let Some(pos) = &result.open_position {
        println!("Open Position:  {} shares @ {:.2} since {}", pos.shares, pos.entry_price, pos.entry_date);
    }
    if result.skipped_entries > 0 {
        println!("Skipped Entries: {}", result.skipped_entries);
    }
    println!("Dataset Hash:   {}", result.dataset_hash);
}

fn print_signal(report: &CompositeReport) {
    let d = &report.direction;
    let s = &report.signal;
    println!("=== Signal ({}) ===", s.risk_tolerance);
    println!("Direction:   {} (confidence {:.2}, score {:+.3})", d.label, d.confidence, d.score);
    let gated = if s.gated { " [confidence gate]" } else { "" };
    println!("Signal:      {} (confidence {:.2}){gated}", s.label, s.confidence);
    println!("Entry:       {:.2}", s.entry);
    println!("Stop Loss:   {}", fmt_opt(s.stop_loss, 2));
    println!("Take Profit: {}", fmt_opt(s.take_profit, 2));
    println!("Risk/Reward: {}", fmt_opt(s.risk_reward_ratio, 2));
    println!("ATR:         {:.3}", s.atr);
    for c in &s.components {
        println!("  {:<11} {:+.3}  {}", c.name.to_string(), c.score, c.reasons.join("; "));
    }
    if !s.reasons.is_empty() {
        println!("Reasons:");
        for r in &s.reasons {
            println!("  - {r}");
        }
    }
    println!();
}

fn print_risk(risk: &RiskEstimate) {
    let v = &risk.volatility;
    println!("=== Risk ({} days forward) ===", risk.forward_days);
    println!("Price:          {:.2}", risk.current_price);
    println!(
        "Volatility:     daily {:.2}%  annual {:.2}%  forward {:.2}%  ({})",
        v.daily * 100.0,
        v.annualized * 100.0,
        v.forward * 100.0,
        v.level
    );
    for r in &risk.price_ranges {
        println!(
            "Range {:>4.0}%:    {:.2} - {:.2}  (±{:.2}%)",
            r.confidence * 100.0,
            r.lower,
            r.upper,
            r.range_pct
        );
    }
    println!("VaR 95:         {:.2}%", risk.var_95 * 100.0);
    println!("CVaR 95:        {:.2}%", risk.cvar_95 * 100.0);
    println!("Max Drawdown:   {:.2}%", risk.max_drawdown * 100.0);
    println!("Expected Price: {:.2} ({:+.2}%)", risk.expected_price, risk.expected_return * 100.0);
    println!("Support:        {:.2}", risk.support);
    println!("Resistance:     {:.2}", risk.resistance);
    println!("ATR:            {:.3} ({:.2}%)", risk.atr, risk.atr_pct);
}

fn print_targets(t: &PriceTargets) {
    println!("=== Price Targets ({} days) ===", t.forward_days);
    println!("Price:        {:.2}", t.current_price);
    println!(
        "Bullish:      {:.2} / {:.2} / {:.2}",
        t.bullish.conservative, t.bullish.moderate, t.bullish.aggressive
    );
    println!(
        "Bearish:      {:.2} / {:.2} / {:.2}",
        t.bearish.conservative, t.bearish.moderate, t.bearish.aggressive
    );
    println!("Trend Target: {:.2} ({:?}, strength {:.2})", t.trend_target, t.trend.direction, t.trend.strength);
    println!("Fib Support:  {:.2}", t.fib_support);
    println!("Fib Resist.:  {:.2}", t.fib_resistance);
    for f in &t.fibonacci {
        println!("  {:>5.3}  {:.2}", f.ratio, f.price);
    }
}

fn print_report(report: &ComprehensiveReport) {
    println!("=== {} @ {:.2} on {} ===", report.symbol, report.current_price, report.date);
    println!();
    print_signal(&CompositeReport {
        direction: report.direction.clone(),
        signal: report.signal.clone(),
    });
    print_risk(&report.risk);
    if let Some(targets) = &report.targets {
        println!();
        print_targets(targets);
    }
    let rec = &report.recommendation;
    println!();
    println!("Recommendation: {} (risk {}, score {:+.3})", rec.action, rec.risk_level, rec.score);
    println!("Summary:        {}", rec.summary);
}

fn print_indicators(bars: &[Bar], last: usize, json: bool) -> Result<()> {
    let values = compute_indicators(bars, &IndicatorParams::default())?;
    let names = values.names();
    let from = bars.len().saturating_sub(last);

    if json {
        let rows: Vec<serde_json::Value> = (from..bars.len())
            .map(|i| {
                let mut row = serde_json::Map::new();
                row.insert("date".into(), bars[i].date.to_string().into());
                row.insert("close".into(), bars[i].close.into());
                for name in &names {
                    row.insert((*name).to_string(), values.get(name, i).into());
                }
                serde_json::Value::Object(row)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    print!("{:<12}", "indicator");
    for bar in &bars[from..] {
        print!("{:>12}", bar.date.to_string());
    }
    println!();
    for name in names {
        print!("{name:<12}");
        for i in from..bars.len() {
            print!("{:>12}", fmt_opt(values.get(name, i), 3));
        }
        println!();
    }
    Ok(())
}

fn print_sweep(best: &[&BacktestResult], total: usize) {
    println!("=== Sweep: top {} of {} ===", best.len(), total);
    println!(
        "{:<28} {:>10} {:>8} {:>8} {:>9} {:>7}",
        "params", "return", "sharpe", "calmar", "max dd", "trades"
    );
    for r in best {
        let params: Vec<String> = r.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let m = &r.metrics;
        println!(
            "{:<28} {:>9.2}% {:>8} {:>8} {:>8.2}% {:>7}",
            params.join(","),
            m.total_return * 100.0,
            fmt_opt(m.sharpe, 2),
            fmt_opt(m.calmar, 2),
            m.max_drawdown * 100.0,
            m.trade_count
        );
    }
}
