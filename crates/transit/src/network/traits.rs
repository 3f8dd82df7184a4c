//! Pluggable IO traits.
//!
//! The loader only sees these; concrete implementations live next door and
//! callers may supply their own (for instance a platform key-value store).

use std::future::Future;
use std::pin::Pin;

use crate::models::types::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetch raw bytes from a URL
pub trait DataFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Persistent key-value store for the raw dataset payload.
///
/// `get` returns `Ok(None)` when nothing is stored under `key`.
pub trait DatasetCache: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>>;

    fn set<'a>(&'a self, key: &'a str, data: &'a [u8]) -> BoxFuture<'a, Result<()>>;
}
