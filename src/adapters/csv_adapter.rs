//! CSV candle data adapter.
//!
//! One file per asset at `<base>/<ASSET>.csv` with a header row and the
//! columns `timestamp,open,high,low,close,volume`. Timestamps are either
//! `%Y-%m-%d %H:%M:%S` or a bare `%Y-%m-%d` date (midnight).

use crate::domain::error::SignalgradeError;
use crate::domain::ohlcv::Candle;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, asset: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", asset))
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SignalgradeError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT).map(|d| d.and_time(Default::default()))
        })
        .map_err(|e| SignalgradeError::Data {
            reason: format!("invalid timestamp '{}': {}", raw, e),
        })
}

fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SignalgradeError> {
    record
        .get(index)
        .ok_or_else(|| SignalgradeError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| SignalgradeError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, asset: &str) -> Result<Vec<Candle>, SignalgradeError> {
        let path = self.csv_path(asset);
        if !path.exists() {
            return Err(SignalgradeError::NoData {
                asset: asset.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| SignalgradeError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SignalgradeError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let raw = record.get(0).ok_or_else(|| SignalgradeError::Data {
                reason: "missing timestamp column".into(),
            })?;

            candles.push(Candle {
                timestamp: parse_timestamp(raw)?,
                open: number(&record, 1, "open")?,
                high: number(&record, 2, "high")?,
                low: number(&record, 3, "low")?,
                close: number(&record, 4, "close")?,
                volume: number(&record, 5, "volume")?,
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }

    fn list_assets(&self) -> Result<Vec<String>, SignalgradeError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalgradeError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut assets = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SignalgradeError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(asset) = name_str.strip_suffix(".csv") {
                assets.push(asset.to_string());
            }
        }

        assets.sort();
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-17 00:00:00,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15 00:00:00,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16 00:00:00,105.0,115.0,100.0,110.0,60000.5\n";

        fs::write(path.join("BTC.csv"), csv_content).unwrap();
        fs::write(
            path.join("ETH.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-15,1,2,0.5,1.5,10\n",
        )
        .unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_candles_sorted_ascending() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("BTC").unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 110.0);
        assert_eq!(candles[0].low, 90.0);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 50000.0);
        assert_eq!(candles[1].volume, 60000.5);
        assert_eq!(candles[2].close, 115.0);
    }

    #[test]
    fn fetch_candles_accepts_bare_dates() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let candles = adapter.fetch_candles("ETH").unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close, 1.5);
    }

    #[test]
    fn fetch_candles_missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_candles("XYZ");
        assert!(matches!(result, Err(SignalgradeError::NoData { asset }) if asset == "XYZ"));
    }

    #[test]
    fn fetch_candles_bad_number_is_data_error() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("BAD.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-15,1,2,x,1.5,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);
        assert!(matches!(
            adapter.fetch_candles("BAD"),
            Err(SignalgradeError::Data { .. })
        ));
    }

    #[test]
    fn list_assets_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_assets().unwrap(), vec!["BTC", "ETH"]);
    }
}
