//! CLI definition and dispatch.
//!
//! Every command follows the same stages: load and validate config, resolve
//! the asset universe, compute, then print a table to stdout and optionally
//! write a CSV report. Pipelines take ports so they can be driven by mocks.

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_signal_adapter::CsvSignalAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::strategy_engine::{latest_context, StrategyBundleEngine};
use crate::domain::backtest::{run_registry, WalkForwardConfig, WalkForwardReport};
use crate::domain::config_validation::validate_all;
use crate::domain::consensus::{
    collect_batches, AssetContext, ConsensusConfig, ConsensusEngine, ConsensusPick, EngineStatus,
};
use crate::domain::error::SignalgradeError;
use crate::domain::execution::SimulatorConfig;
use crate::domain::indicator::{IndicatorConfig, IndicatorSet};
use crate::domain::scan::{scan_latest, LiveSignal};
use crate::domain::strategy::{StrategyId, StrategyRegistry};
use crate::domain::universe::{load_universe, parse_assets, LoadedAsset};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::engine_port::EngineSource;
use crate::ports::report_port::{AssetReport, ReportPort};

const DEFAULT_BUNDLE_ENGINE: &str = "strategies";

#[derive(Parser, Debug)]
#[command(
    name = "signalgrade",
    about = "Strategy backtester and multi-engine signal grader"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk-forward backtest of every enabled strategy on every asset
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of <ASSET>.csv candle files
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Comma-separated asset list
        #[arg(short, long)]
        assets: Option<String>,
        /// Comma-separated strategy ids
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Latest signal of every strategy on every asset
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        assets: Option<String>,
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Grade external engine signals into consensus picks
    Grade {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV of engine,asset,direction,confidence rows
        #[arg(long)]
        signals: Option<PathBuf>,
        /// CSV of asset,price,atr[,liquidity] rows
        #[arg(long)]
        quotes: Option<PathBuf>,
        /// Candle directory; adds the strategy bundle as an engine
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        assets: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List assets with candle files in a data directory
    ListAssets {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            assets,
            strategy,
            output,
            dry_run,
        } => run_backtest(
            &config,
            data.as_ref(),
            assets.as_deref(),
            strategy.as_deref(),
            output.as_ref(),
            dry_run,
        ),
        Command::Scan {
            config,
            data,
            assets,
            strategy,
        } => run_scan(&config, data.as_ref(), assets.as_deref(), strategy.as_deref()),
        Command::Grade {
            config,
            signals,
            quotes,
            data,
            assets,
            output,
        } => run_grade(
            &config,
            signals.as_ref(),
            quotes.as_ref(),
            data.as_ref(),
            assets.as_deref(),
            output.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListAssets { data } => run_list_assets(&data),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, SignalgradeError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| SignalgradeError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// `--assets` wins over `[data] assets`. Tokens are trimmed and uppercased.
pub fn resolve_assets(
    assets_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, SignalgradeError> {
    let raw = match assets_override {
        Some(list) => list.to_string(),
        None => config
            .get_string("data", "assets")
            .ok_or_else(|| SignalgradeError::ConfigMissing {
                section: "data".into(),
                key: "assets".into(),
            })?,
    };
    Ok(parse_assets(&raw)?)
}

pub fn resolve_data_dir(
    data_override: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, SignalgradeError> {
    if let Some(dir) = data_override {
        return Ok(dir.clone());
    }
    config
        .get_string("data", "dir")
        .map(PathBuf::from)
        .ok_or_else(|| SignalgradeError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })
}

/// Strategies from config, narrowed by `--strategy` or `[strategies] enabled`.
pub fn build_registry(
    strategy_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<StrategyRegistry, SignalgradeError> {
    let registry = StrategyRegistry::from_config(config);
    let selection = strategy_override
        .map(str::to_string)
        .or_else(|| config.get_string("strategies", "enabled"))
        .filter(|s| !s.trim().is_empty());

    let Some(selection) = selection else {
        return Ok(registry);
    };
    let ids = selection
        .split(',')
        .map(str::parse::<StrategyId>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(registry.retain(&ids))
}

/// Walk-forward reports for one asset, in registry order.
#[derive(Debug)]
pub struct AssetWalkForward {
    pub asset: String,
    pub reports: Vec<WalkForwardReport>,
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    assets: Vec<String>,
    registry: &StrategyRegistry,
) -> Result<Vec<AssetWalkForward>, SignalgradeError> {
    let indicator_config = IndicatorConfig::from_config(config);
    let sim = SimulatorConfig::from_config(config);
    let wf = WalkForwardConfig::from_config(config);

    let universe = load_universe(data_port, assets)?;
    info!(
        assets = universe.loaded.len(),
        strategies = registry.len(),
        train_ratio = wf.train_ratio,
        "running walk-forward"
    );

    let mut results = Vec::with_capacity(universe.loaded.len());
    for LoadedAsset { asset, candles } in universe.loaded {
        let indicators = IndicatorSet::compute(&candles, &indicator_config)?;
        let reports = run_registry(registry, &indicators, &sim, &wf);
        results.push(AssetWalkForward { asset, reports });
    }
    Ok(results)
}

pub fn run_scan_pipeline(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    assets: Vec<String>,
    registry: &StrategyRegistry,
) -> Result<Vec<(String, Vec<LiveSignal>)>, SignalgradeError> {
    let indicator_config = IndicatorConfig::from_config(config);
    let universe = load_universe(data_port, assets)?;

    let mut results = Vec::with_capacity(universe.loaded.len());
    for loaded in universe.loaded {
        let indicators = IndicatorSet::compute(&loaded.candles, &indicator_config)?;
        results.push((loaded.asset, scan_latest(registry, &indicators)));
    }
    Ok(results)
}

pub fn run_grade_pipeline(
    sources: &[&dyn EngineSource],
    contexts: &HashMap<String, AssetContext>,
    config: &dyn ConfigPort,
    now: NaiveDateTime,
) -> Result<Vec<ConsensusPick>, SignalgradeError> {
    let consensus_config = ConsensusConfig::from_config(config);
    consensus_config.validate()?;

    let batches = collect_batches(sources);
    let available = batches
        .iter()
        .filter(|b| matches!(b.status, EngineStatus::Available(_)))
        .count();
    info!(
        engines = batches.len(),
        available,
        assets = contexts.len(),
        "grading consensus"
    );
    if available < batches.len() {
        warn!(
            unavailable = batches.len() - available,
            "grading with reduced engine set"
        );
    }

    Ok(ConsensusEngine::new(consensus_config).grade(&batches, contexts, now))
}

fn run_backtest(
    config_path: &PathBuf,
    data_override: Option<&PathBuf>,
    assets_override: Option<&str>,
    strategy_override: Option<&str>,
    output_path: Option<&PathBuf>,
    dry_run: bool,
) -> Result<(), SignalgradeError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;
    let assets = resolve_assets(assets_override, &config)?;
    let registry = build_registry(strategy_override, &config)?;
    let data_dir = resolve_data_dir(data_override, &config)?;

    if dry_run {
        println!("Config:     {}", config_path.display());
        println!("Data:       {}", data_dir.display());
        println!("Assets:     {}", assets.join(", "));
        let ids: Vec<&str> = registry.iter().map(|s| s.id().as_str()).collect();
        println!("Strategies: {}", ids.join(", "));
        println!("Dry run complete: configuration is valid");
        return Ok(());
    }

    let data_port = CsvAdapter::new(data_dir);
    let results = run_backtest_pipeline(&data_port, &config, assets, &registry)?;
    print_walk_forward(&results);

    if let Some(output) = output_path {
        let reports: Vec<AssetReport<'_>> = results
            .iter()
            .flat_map(|r| {
                r.reports.iter().map(|report| AssetReport {
                    asset: &r.asset,
                    report,
                })
            })
            .collect();
        CsvReportAdapter::new().write_walk_forward(&reports, &output.display().to_string())?;
        info!(path = %output.display(), "report written");
    }
    Ok(())
}

fn run_scan(
    config_path: &PathBuf,
    data_override: Option<&PathBuf>,
    assets_override: Option<&str>,
    strategy_override: Option<&str>,
) -> Result<(), SignalgradeError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;
    let assets = resolve_assets(assets_override, &config)?;
    let registry = build_registry(strategy_override, &config)?;
    let data_port = CsvAdapter::new(resolve_data_dir(data_override, &config)?);

    let results = run_scan_pipeline(&data_port, &config, assets, &registry)?;
    print_scan(&results);
    Ok(())
}

fn run_grade(
    config_path: &PathBuf,
    signals_path: Option<&PathBuf>,
    quotes_path: Option<&PathBuf>,
    data_override: Option<&PathBuf>,
    assets_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> Result<(), SignalgradeError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;
    let consensus_config = ConsensusConfig::from_config(&config);

    let csv_sources = match signals_path {
        Some(path) => CsvSignalAdapter::new(path.clone()).sources()?,
        None => Vec::new(),
    };
    let mut contexts = match quotes_path {
        Some(path) => CsvSignalAdapter::new(path.clone()).contexts(&consensus_config)?,
        None => HashMap::new(),
    };

    let data_dir = match data_override {
        Some(dir) => Some(dir.clone()),
        None if signals_path.is_none() => Some(resolve_data_dir(None, &config)?),
        None => None,
    };

    let bundle = match data_dir {
        Some(dir) => {
            let assets = resolve_assets(assets_override, &config)?;
            let universe = load_universe(&CsvAdapter::new(dir), assets)?;
            let indicator_config = IndicatorConfig::from_config(&config);
            for loaded in &universe.loaded {
                if contexts.contains_key(&loaded.asset) {
                    continue;
                }
                let indicators = IndicatorSet::compute(&loaded.candles, &indicator_config)?;
                let liquidity = consensus_config.liquidity_of(&loaded.asset);
                if let Some(context) = latest_context(&loaded.asset, &indicators, liquidity) {
                    contexts.insert(loaded.asset.clone(), context);
                }
            }
            let name = config
                .get_string("strategies", "engine_name")
                .unwrap_or_else(|| DEFAULT_BUNDLE_ENGINE.to_string());
            Some(StrategyBundleEngine::new(
                &name,
                build_registry(None, &config)?,
                indicator_config,
                universe.loaded,
            ))
        }
        None => None,
    };

    let mut sources: Vec<&dyn EngineSource> =
        csv_sources.iter().map(|s| s as &dyn EngineSource).collect();
    if let Some(engine) = bundle.as_ref() {
        sources.push(engine);
    }
    if sources.is_empty() {
        return Err(SignalgradeError::ConfigMissing {
            section: "grade".into(),
            key: "signals".into(),
        });
    }

    let now = Local::now().naive_local();
    let picks = run_grade_pipeline(&sources, &contexts, &config, now)?;
    print_picks(&picks);

    if let Some(output) = output_path {
        CsvReportAdapter::new().write_picks(&picks, &output.display().to_string())?;
        info!(path = %output.display(), picks = picks.len(), "picks written");
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), SignalgradeError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;

    let registry = build_registry(None, &config)?;
    let consensus = ConsensusConfig::from_config(&config);
    println!("Strategies:");
    for strategy in registry.iter() {
        println!("  {:<18} {}", strategy.id().as_str(), strategy.name());
    }
    println!("Consensus tiers:");
    for rule in &consensus.tier_rules {
        println!(
            "  {:<3} engines >= {}, confidence >= {:.0}, tp {:.1} ATR, sl {:.1} ATR",
            rule.tier.to_string(),
            rule.min_engines,
            rule.min_confidence,
            rule.tp_atr,
            rule.sl_atr
        );
    }
    println!("Pick lifetime: {} h", consensus.pick_ttl_hours);
    println!("Configuration is valid.");
    Ok(())
}

fn run_list_assets(data_dir: &PathBuf) -> Result<(), SignalgradeError> {
    let assets = CsvAdapter::new(data_dir.clone()).list_assets()?;
    if assets.is_empty() {
        warn!(dir = %data_dir.display(), "no candle files found");
    }
    for asset in &assets {
        println!("{asset}");
    }
    Ok(())
}

pub fn print_walk_forward(results: &[AssetWalkForward]) {
    println!(
        "{:<8} {:<18} {:>6} {:>8} {:>9} {:>6} {:>8} {:>9} {:>8}",
        "ASSET", "STRATEGY", "TRADES", "WIN%", "RETURN%", "TRADES", "WIN%", "RETURN%", "OVERFIT"
    );
    for result in results {
        for report in &result.reports {
            println!(
                "{:<8} {:<18} {:>6} {:>8.1} {:>9.2} {:>6} {:>8.1} {:>9.2} {:>8.2}",
                result.asset,
                report.strategy.as_str(),
                report.train.trade_count(),
                report.train.win_rate * 100.0,
                report.train.total_return,
                report.test.trade_count(),
                report.test.win_rate * 100.0,
                report.test.total_return,
                report.overfit_ratio,
            );
        }
    }
}

pub fn print_scan(results: &[(String, Vec<LiveSignal>)]) {
    for (asset, signals) in results {
        let when = signals
            .first()
            .map(|s| s.snapshot.timestamp.to_string())
            .unwrap_or_default();
        println!("{asset} @ {when}");
        for live in signals {
            println!("  {:<18} {}", live.strategy.as_str(), live.signal);
        }
        if let Some(first) = signals.first() {
            let values: Vec<String> = first
                .snapshot
                .values
                .iter()
                .map(|(kind, value)| format!("{kind}={value:.2}"))
                .collect();
            println!("  {}", values.join(" "));
        }
    }
}

pub fn print_picks(picks: &[ConsensusPick]) {
    if picks.is_empty() {
        println!("No qualifying consensus picks.");
        return;
    }
    println!(
        "{:<4} {:<8} {:<6} {:>6} {:>12} {:>12} {:>12}  ENGINES",
        "TIER", "ASSET", "SIDE", "SCORE", "ENTRY", "TP", "SL"
    );
    for pick in picks {
        let engines: Vec<&str> = pick.engines.iter().map(|c| c.engine.as_str()).collect();
        println!(
            "{:<4} {:<8} {:<6} {:>6.1} {:>12.4} {:>12.4} {:>12.4}  {}",
            pick.tier.to_string(),
            pick.asset,
            pick.direction.to_string(),
            pick.consensus_score,
            pick.entry_price,
            pick.tp_price,
            pick.sl_price,
            engines.join(",")
        );
    }
}
