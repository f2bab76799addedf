//! Report output port.

use crate::domain::backtest::WalkForwardReport;
use crate::domain::consensus::ConsensusPick;
use crate::domain::error::SignalgradeError;

/// One walk-forward report tagged with the asset it was run on.
#[derive(Debug, Clone, Copy)]
pub struct AssetReport<'a> {
    pub asset: &'a str,
    pub report: &'a WalkForwardReport,
}

pub trait ReportPort {
    fn write_walk_forward(
        &self,
        reports: &[AssetReport<'_>],
        output_path: &str,
    ) -> Result<(), SignalgradeError>;

    fn write_picks(&self, picks: &[ConsensusPick], output_path: &str) -> Result<(), SignalgradeError>;
}
