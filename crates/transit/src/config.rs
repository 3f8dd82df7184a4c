//! Runtime configuration.
//!
//! Read from a JSON file; every field has a default, so `{}` is a valid
//! config.
//!
//! ```json
//! {
//!   "source": { "url": "https://data.hkbus.app/routeFareList.min.json" },
//!   "cache_path": "/var/cache/busmap/dataset.db",
//!   "preferred_language": "zh",
//!   "default_operators": ["kmb", "ctb"],
//!   "max_results": 10,
//!   "min_results": 2
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::identifiers::CompanyCode;
use crate::loader::{DatasetLoader, DatasetSource, DEFAULT_CACHE_KEY};
use crate::models::{LanguageChain, Result, TransitError, FALLBACK_LANGUAGE};
use crate::network::SqliteCache;
use crate::spatial::queries::{default_operators, NearbyQuery, DEFAULT_MAX_RESULTS, DEFAULT_MIN_RESULTS};

pub const DEFAULT_DATASET_URL: &str = "https://data.hkbus.app/routeFareList.min.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    pub source: DatasetSource,
    /// SQLite file for the dataset cache; no caching when unset
    pub cache_path: Option<PathBuf>,
    pub cache_key: String,
    pub preferred_language: String,
    /// Operator filter applied when a query doesn't name one
    pub default_operators: Vec<CompanyCode>,
    pub max_results: usize,
    pub min_results: usize,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            source: DatasetSource::Url(DEFAULT_DATASET_URL.to_string()),
            cache_path: None,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            preferred_language: FALLBACK_LANGUAGE.to_string(),
            default_operators: default_operators(),
            max_results: DEFAULT_MAX_RESULTS,
            min_results: DEFAULT_MIN_RESULTS,
        }
    }
}

impl TransitConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TransitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TransitError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(TransitError::Config("max_results must be at least 1".into()));
        }
        if self.cache_key.trim().is_empty() {
            return Err(TransitError::Config("cache_key must not be empty".into()));
        }
        match &self.source {
            DatasetSource::Url(url) if url.trim().is_empty() => {
                Err(TransitError::Config("source url must not be empty".into()))
            }
            DatasetSource::Path(path) if path.as_os_str().is_empty() => {
                Err(TransitError::Config("source path must not be empty".into()))
            }
            _ => Ok(()),
        }
    }

    pub fn language_chain(&self) -> LanguageChain {
        LanguageChain::new(&self.preferred_language)
    }

    /// A nearby query carrying this config's result limits and operators.
    pub fn nearby_query(&self, lat: f64, lng: f64, radius_m: f64) -> NearbyQuery {
        NearbyQuery::new(lat, lng, radius_m)
            .with_max_results(self.max_results)
            .with_min_results(self.min_results)
            .with_operators(self.default_operators.iter().cloned())
    }

    /// Loader for the configured source, with the SQLite cache when
    /// `cache_path` is set.
    pub fn build_loader(&self) -> Result<DatasetLoader> {
        let loader = DatasetLoader::new(self.source.clone()).with_cache_key(&self.cache_key);
        match &self.cache_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Ok(loader.with_cache(Arc::new(SqliteCache::open(path)?)))
            }
            None => Ok(loader),
        }
    }
}
