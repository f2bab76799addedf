//! CSV report adapter implementing ReportPort.
//!
//! Walk-forward reports are written one row per (asset, strategy) with the
//! train and test metrics side by side. Picks are written one row each, best
//! first, in the order the grader returned them. The `engines` column holds
//! `engine:confidence x weight` entries joined by `;`.

use std::fs::File;
use std::path::Path;

use crate::domain::consensus::ConsensusPick;
use crate::domain::error::SignalgradeError;
use crate::domain::metrics::BacktestResult;
use crate::ports::report_port::{AssetReport, ReportPort};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const METRIC_COLUMNS: [&str; 8] = [
    "trades",
    "win_rate",
    "profit_factor",
    "sharpe",
    "max_drawdown",
    "total_return",
    "expectancy",
    "avg_bars_held",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn writer(output_path: &str) -> Result<csv::Writer<File>, SignalgradeError> {
    let file = File::create(Path::new(output_path))?;
    Ok(csv::Writer::from_writer(file))
}

fn csv_error(e: csv::Error) -> SignalgradeError {
    SignalgradeError::Io(std::io::Error::other(e))
}

fn metric_fields(result: &BacktestResult) -> Vec<String> {
    vec![
        result.trade_count().to_string(),
        format!("{:.4}", result.win_rate),
        format!("{:.4}", result.profit_factor),
        format!("{:.4}", result.sharpe),
        format!("{:.4}", result.max_drawdown),
        format!("{:.4}", result.total_return),
        format!("{:.4}", result.expectancy),
        format!("{:.2}", result.avg_bars_held),
    ]
}

impl ReportPort for CsvReportAdapter {
    fn write_walk_forward(
        &self,
        reports: &[AssetReport<'_>],
        output_path: &str,
    ) -> Result<(), SignalgradeError> {
        let mut wtr = writer(output_path)?;

        let mut header = vec![
            "asset".to_string(),
            "strategy".to_string(),
            "train_bars".to_string(),
            "test_bars".to_string(),
        ];
        for prefix in ["train", "test"] {
            header.extend(METRIC_COLUMNS.iter().map(|c| format!("{prefix}_{c}")));
        }
        header.push("overfit_ratio".to_string());
        wtr.write_record(&header).map_err(csv_error)?;

        for entry in reports {
            let report = entry.report;
            let mut row = vec![
                entry.asset.to_string(),
                report.strategy.to_string(),
                report.split.train.len().to_string(),
                report.split.test.len().to_string(),
            ];
            row.extend(metric_fields(&report.train));
            row.extend(metric_fields(&report.test));
            row.push(format!("{:.4}", report.overfit_ratio));
            wtr.write_record(&row).map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_picks(&self, picks: &[ConsensusPick], output_path: &str) -> Result<(), SignalgradeError> {
        let mut wtr = writer(output_path)?;
        wtr.write_record([
            "asset",
            "direction",
            "tier",
            "score",
            "entry",
            "tp",
            "sl",
            "engines",
            "created_at",
            "expires_at",
            "thesis",
        ])
        .map_err(csv_error)?;

        for pick in picks {
            let engines = pick
                .engines
                .iter()
                .map(|c| format!("{}:{:.0}x{}", c.engine, c.confidence, c.weight))
                .collect::<Vec<_>>()
                .join(";");
            wtr.write_record([
                pick.asset.clone(),
                pick.direction.to_string(),
                pick.tier.to_string(),
                format!("{:.2}", pick.consensus_score),
                format!("{:.6}", pick.entry_price),
                format!("{:.6}", pick.tp_price),
                format!("{:.6}", pick.sl_price),
                engines,
                pick.created_at.format(TIMESTAMP_FORMAT).to_string(),
                pick.expires_at.format(TIMESTAMP_FORMAT).to_string(),
                pick.thesis.clone(),
            ])
            .map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
