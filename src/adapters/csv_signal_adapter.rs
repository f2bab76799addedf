//! CSV import of external engine signals and market quotes.
//!
//! Signals file: `engine,asset,direction,confidence[,metadata]` where
//! metadata is `key=value` pairs separated by `;`. Every distinct engine
//! becomes its own [`EngineSource`].
//!
//! Quotes file: `asset,price,atr[,liquidity]`. A blank liquidity column
//! falls back to the configured class for the asset.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::consensus::{AssetContext, ConsensusConfig, EngineSignal, LiquidityClass};
use crate::domain::error::SignalgradeError;
use crate::domain::signal::Direction;
use crate::ports::engine_port::EngineSource;

/// Signals from one engine, read ahead of grading.
#[derive(Debug, Clone)]
pub struct CsvEngineSource {
    name: String,
    signals: Vec<EngineSignal>,
}

impl CsvEngineSource {
    pub fn signals(&self) -> &[EngineSignal] {
        &self.signals
    }
}

impl EngineSource for CsvEngineSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<EngineSignal>, SignalgradeError> {
        Ok(self.signals.clone())
    }
}

/// Reads signal and quote files from disk.
pub struct CsvSignalAdapter {
    path: PathBuf,
}

impl CsvSignalAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn sources(&self) -> Result<Vec<CsvEngineSource>, SignalgradeError> {
        load_engine_sources(&self.path)
    }

    pub fn contexts(
        &self,
        config: &ConsensusConfig,
    ) -> Result<HashMap<String, AssetContext>, SignalgradeError> {
        load_asset_contexts(&self.path, config)
    }
}

fn read_records(path: &Path) -> Result<Vec<csv::StringRecord>, SignalgradeError> {
    let content = fs::read_to_string(path).map_err(|e| SignalgradeError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    rdr.records()
        .map(|r| {
            r.map_err(|e| SignalgradeError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })
        })
        .collect()
}

fn column<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, SignalgradeError> {
    record
        .get(index)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SignalgradeError::Data {
            reason: format!("missing {} column", name),
        })
}

fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SignalgradeError> {
    column(record, index, name)?
        .parse()
        .map_err(|e| SignalgradeError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_metadata(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Loads a signals file into one source per engine, in first-seen order.
pub fn load_engine_sources(path: &Path) -> Result<Vec<CsvEngineSource>, SignalgradeError> {
    let mut sources: Vec<CsvEngineSource> = Vec::new();

    for record in read_records(path)? {
        let engine = column(&record, 0, "engine")?;
        let asset = column(&record, 1, "asset")?;
        let direction: Direction = column(&record, 2, "direction")?
            .parse()
            .map_err(|reason| SignalgradeError::Data { reason })?;
        let confidence = number(&record, 3, "confidence")?;

        let mut signal = EngineSignal::new(engine, asset, direction, confidence);
        if let Some(raw) = record.get(4) {
            signal.metadata = parse_metadata(raw);
        }

        match sources.iter_mut().find(|s| s.name == engine) {
            Some(source) => source.signals.push(signal),
            None => sources.push(CsvEngineSource {
                name: engine.to_string(),
                signals: vec![signal],
            }),
        }
    }

    debug!(path = %path.display(), engines = sources.len(), "engine signals loaded");
    Ok(sources)
}

/// Loads a quotes file keyed by uppercase asset.
pub fn load_asset_contexts(
    path: &Path,
    config: &ConsensusConfig,
) -> Result<HashMap<String, AssetContext>, SignalgradeError> {
    let mut contexts = HashMap::new();

    for record in read_records(path)? {
        let asset = column(&record, 0, "asset")?.to_ascii_uppercase();
        let liquidity = match record.get(3).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<LiquidityClass>()
                .map_err(|reason| SignalgradeError::Data { reason })?,
            None => config.liquidity_of(&asset),
        };
        let context = AssetContext {
            asset: asset.clone(),
            price: number(&record, 1, "price")?,
            atr: number(&record, 2, "atr")?,
            liquidity,
        };
        contexts.insert(asset, context);
    }

    Ok(contexts)
}
