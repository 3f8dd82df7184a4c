//! # busmap-transit
//!
//! Stop and route lookups over a static, city-scale bus dataset.
//!
//! ## Features
//!
//! - **Offline-first**: the raw payload is cached after the first fetch
//! - **Adaptive radius search**: nearby stops widen from 1× to 2× to 4× the
//!   requested radius until enough are found
//! - **Reverse indices**: stop → routes and stop → operators, built once per load
//! - **Free-text route search**: case- and accent-insensitive, across every
//!   language variant of stop names
//! - **Atomic reloads**: queries run against immutable snapshots
//!
//! ## Example
//!
//! ```
//! use busmap_transit::prelude::*;
//!
//! let payload = br#"{
//!     "stopList": {
//!         "S1": {"location": {"lat": 22.2941, "lng": 114.1685}, "name": {"en": "Star Ferry"}}
//!     },
//!     "routeList": {
//!         "1+1+STAR FERRY+CHUK YUEN": {"route": "1", "co": ["kmb"], "stops": {"kmb": ["S1"]}}
//!     }
//! }"#;
//!
//! let provider = StaticTransitProvider::from_dataset(Dataset::from_slice(payload).unwrap());
//!
//! let nearby = provider.stops_near(&NearbyQuery::new(22.294, 114.1685, 100.0));
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(provider.routes_by_stop("S1", &[]).len(), 1);
//! ```

pub mod config;
pub mod identifiers;
pub mod loader;
pub mod models;
pub mod network;
pub mod provider;
pub mod relational;
pub mod reverse_index;
pub mod spatial;

#[cfg(test)]
mod fixtures;

// Re-exports for convenience
pub mod prelude {
    pub use crate::config::TransitConfig;
    pub use crate::identifiers::*;
    pub use crate::loader::{DatasetLoader, DatasetSource};
    pub use crate::models::{
        Dataset, LanguageChain, LocalizedName, Result, Route, Stop, TransitError, TransitQueries,
    };
    pub use crate::network::{DataFetcher, DatasetCache, HttpFetcher, MemoryCache, NoCache, SqliteCache};
    pub use crate::provider::{StaticTransitProvider, TransitService};
    pub use crate::relational::{CompanyStops, RouteStop};
    pub use crate::spatial::{default_operators, NearbyQuery, StopHit};
}

pub use prelude::*;
