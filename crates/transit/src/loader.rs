//! Dataset loading: cache first, then the configured source.
//!
//! 1. Read the cached payload; a read error or unparsable payload counts as
//!    a miss.
//! 2. On a miss, fetch from the source (HTTP or local file) and parse.
//! 3. Write the parsed dataset back to the cache. Failures here are logged
//!    and never fail the load.
//! 4. Build the indices and hand back a ready snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Dataset, Result};
use crate::network::{DataFetcher, DatasetCache, HttpFetcher, NoCache};
use crate::provider::StaticTransitProvider;

pub const DEFAULT_CACHE_KEY: &str = "transit-dataset";

/// Where the raw payload comes from on a cache miss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSource {
    Url(String),
    Path(PathBuf),
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

pub struct DatasetLoader {
    source: DatasetSource,
    cache_key: String,
    cache: Arc<dyn DatasetCache>,
    fetcher: Arc<dyn DataFetcher>,
}

impl DatasetLoader {
    /// Loader with no cache and the default HTTP fetcher.
    pub fn new(source: DatasetSource) -> Self {
        Self {
            source,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache: Arc::new(NoCache),
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn DatasetCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn DataFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    /// Load and index.
    pub async fn load(&self) -> Result<StaticTransitProvider> {
        let dataset = self.fetch_dataset().await?;
        let provider = StaticTransitProvider::from_dataset(dataset);
        tracing::info!(
            stops = provider.stops().len(),
            routes = provider.routes().len(),
            "transit dataset loaded"
        );
        Ok(provider)
    }

    /// Load the parsed dataset without building indices.
    pub async fn fetch_dataset(&self) -> Result<Dataset> {
        if let Some(dataset) = self.read_cache().await {
            tracing::debug!(key = %self.cache_key, "dataset served from cache");
            return Ok(dataset);
        }

        let bytes = match &self.source {
            DatasetSource::Url(url) => self.fetcher.fetch(url).await?,
            DatasetSource::Path(path) => tokio::fs::read(path).await?,
        };
        tracing::debug!(source = %self.source, bytes = bytes.len(), "dataset fetched");

        let dataset = Dataset::from_slice(&bytes)?;
        self.write_cache(&dataset).await;
        Ok(dataset)
    }

    async fn read_cache(&self) -> Option<Dataset> {
        let bytes = match self.cache.get(&self.cache_key).await {
            Ok(bytes) => bytes?,
            Err(error) => {
                tracing::warn!(key = %self.cache_key, %error, "dataset cache read failed");
                return None;
            }
        };

        match Dataset::from_slice(&bytes) {
            Ok(dataset) => Some(dataset),
            Err(error) => {
                tracing::warn!(key = %self.cache_key, %error, "cached dataset is unreadable");
                None
            }
        }
    }

    async fn write_cache(&self, dataset: &Dataset) {
        let bytes = match dataset.to_vec() {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(%error, "could not serialize dataset for cache");
                return;
            }
        };

        if let Err(error) = self.cache.set(&self.cache_key, &bytes).await {
            tracing::warn!(key = %self.cache_key, %error, "dataset cache write failed");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::fixtures::PAYLOAD;
    use crate::models::TransitError;
    use crate::network::{BoxFuture, MemoryCache};

    /// Serves a fixed payload (or an HTTP error) and counts calls.
    pub(crate) struct StubFetcher {
        payload: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl StubFetcher {
        pub(crate) fn serving(payload: &'static str) -> Arc<Self> {
            Arc::new(Self {
                payload: Some(payload),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn failing() -> Arc<Self> {
            Arc::new(Self {
                payload: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl DataFetcher for StubFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = match self.payload {
                Some(payload) => Ok(payload.as_bytes().to_vec()),
                None => Err(TransitError::HttpStatus {
                    url: url.to_string(),
                    status: 503,
                }),
            };
            Box::pin(future::ready(result))
        }
    }

    /// Reads miss, writes fail.
    struct BrokenCache;

    impl DatasetCache for BrokenCache {
        fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>> {
            Box::pin(future::ready(Err(TransitError::InvalidData("disk gone".into()))))
        }

        fn set<'a>(&'a self, _key: &'a str, _data: &'a [u8]) -> BoxFuture<'a, Result<()>> {
            Box::pin(future::ready(Err(TransitError::InvalidData("disk full".into()))))
        }
    }

    fn url() -> DatasetSource {
        DatasetSource::Url("https://example.invalid/dataset.json".into())
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_writes_back() {
        let cache = Arc::new(MemoryCache::new());
        let fetcher = StubFetcher::serving(PAYLOAD);
        let loader = DatasetLoader::new(url())
            .with_cache(cache.clone())
            .with_fetcher(fetcher.clone());

        let provider = loader.load().await.unwrap();
        assert_eq!(provider.stops().len(), 11);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let cached = cache.get(DEFAULT_CACHE_KEY).await.unwrap().unwrap();
        let reparsed = Dataset::from_slice(&cached).unwrap();
        assert_eq!(reparsed.stops(), provider.stops());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_fetch() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("hk", PAYLOAD.as_bytes()).await.unwrap();

        let fetcher = StubFetcher::failing();
        let loader = DatasetLoader::new(url())
            .with_cache(cache)
            .with_cache_key("hk")
            .with_fetcher(fetcher.clone());

        let provider = loader.load().await.unwrap();
        assert_eq!(provider.routes().len(), 5);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_cache_falls_back_to_fetch() {
        let cache = Arc::new(MemoryCache::new());
        cache.set(DEFAULT_CACHE_KEY, b"{truncated").await.unwrap();

        let fetcher = StubFetcher::serving(PAYLOAD);
        let loader = DatasetLoader::new(url())
            .with_cache(cache.clone())
            .with_fetcher(fetcher.clone());

        assert!(loader.load().await.is_ok());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        // The broken entry was replaced.
        let cached = cache.get(DEFAULT_CACHE_KEY).await.unwrap().unwrap();
        assert!(Dataset::from_slice(&cached).is_ok());
    }

    #[tokio::test]
    async fn test_cache_failures_do_not_fail_load() {
        let loader = DatasetLoader::new(url())
            .with_cache(Arc::new(BrokenCache))
            .with_fetcher(StubFetcher::serving(PAYLOAD));

        let provider = loader.load().await.unwrap();
        assert!(!provider.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let loader = DatasetLoader::new(url()).with_fetcher(StubFetcher::failing());
        let error = loader.load().await.err().unwrap();
        assert!(matches!(error, TransitError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unparsable_payload_is_reported() {
        let cache = Arc::new(MemoryCache::new());
        let loader = DatasetLoader::new(url())
            .with_cache(cache.clone())
            .with_fetcher(StubFetcher::serving("[]"));

        assert!(matches!(loader.load().await, Err(TransitError::Parse(_))));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(&path, PAYLOAD).unwrap();

        let loader = DatasetLoader::new(DatasetSource::Path(path));
        let provider = loader.load().await.unwrap();
        assert_eq!(provider.stops().len(), 11);

        let missing = DatasetLoader::new(DatasetSource::Path(dir.path().join("nope.json")));
        assert!(matches!(missing.load().await, Err(TransitError::Io(_))));
    }

    #[tokio::test]
    async fn test_reload_builds_identical_indices() {
        let loader = DatasetLoader::new(url()).with_fetcher(StubFetcher::serving(PAYLOAD));
        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();
        assert_eq!(first.reverse_index(), second.reverse_index());
        assert_eq!(first.stops(), second.stops());
    }
}
