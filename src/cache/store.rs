use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::models::{CandleSeries, Granularity};

/// Persistence seam for cached candle series, one series per
/// `(product_id, granularity)` pair.
///
/// A pair that was never saved loads as an empty series; only unreadable
/// or undecodable data is an error.
pub trait SeriesStore: Send + Sync {
    fn load(&self, product_id: &str, granularity: Granularity) -> Result<CandleSeries>;
    fn save(
        &self,
        product_id: &str,
        granularity: Granularity,
        series: &CandleSeries,
    ) -> Result<()>;
}

/// Keeps each series as a JSON candle array in one directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, product_id: &str, granularity: Granularity) -> PathBuf {
        self.dir.join(format!(
            "candles-{}-{}.json",
            granularity.as_secs(),
            product_id
        ))
    }

    fn store_err(&self, path: &Path, source: io::Error) -> ClientError {
        ClientError::Store {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SeriesStore for JsonFileStore {
    fn load(&self, product_id: &str, granularity: Granularity) -> Result<CandleSeries> {
        let path = self.path_for(product_id, granularity);
        if !path.exists() {
            return Ok(CandleSeries::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| self.store_err(&path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| self.store_err(&path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn save(
        &self,
        product_id: &str,
        granularity: Granularity,
        series: &CandleSeries,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| self.store_err(&self.dir, e))?;

        let path = self.path_for(product_id, granularity);
        let json = serde_json::to_string(series)?;

        // Write-then-rename so a failure mid-save leaves the previous
        // file untouched.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.store_err(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| self.store_err(&path, e))?;

        debug!("Saved {} candles to {}", series.len(), path.display());
        Ok(())
    }
}
