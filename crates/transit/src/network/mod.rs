//! Network and IO abstractions.

pub mod cache;
pub mod http;
pub mod traits;

pub use cache::{MemoryCache, NoCache, SqliteCache};
pub use http::HttpFetcher;
pub use traits::{BoxFuture, DataFetcher, DatasetCache};
