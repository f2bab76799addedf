//! Signal engine port.
//!
//! An engine source is one independent opinion feeding the consensus grader:
//! a strategy bundle, an external model, an imported batch file. Timeouts and
//! retries belong to the implementation; a failed fetch becomes an
//! unavailable batch rather than an error for the grader.

use crate::domain::consensus::EngineSignal;
use crate::domain::error::SignalgradeError;

pub trait EngineSource: Send + Sync {
    fn name(&self) -> &str;
    fn fetch(&self) -> Result<Vec<EngineSignal>, SignalgradeError>;
}
