//! Reloadable query service.
//!
//! Holds the current [`StaticTransitProvider`] behind an `Arc`. Every query
//! grabs the `Arc` once and runs against that snapshot, so a reload that
//! lands mid-query never exposes a half-built index. Reloads build the new
//! snapshot off-lock and swap it in with a single write.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::identifiers::*;
use crate::loader::DatasetLoader;
use crate::models::{Result, Route, Stop, TransitQueries};
use crate::provider::StaticTransitProvider;
use crate::relational::CompanyStops;
use crate::spatial::{NearbyQuery, StopHit};

#[derive(Default)]
pub struct TransitService {
    current: RwLock<Arc<StaticTransitProvider>>,
    // One reload at a time; queries never take this.
    reloading: tokio::sync::Mutex<()>,
}

impl TransitService {
    /// A service with nothing loaded; every query returns empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_provider(provider: StaticTransitProvider) -> Self {
        Self {
            current: RwLock::new(Arc::new(provider)),
            reloading: tokio::sync::Mutex::new(()),
        }
    }

    /// The snapshot queries currently run against.
    pub fn snapshot(&self) -> Arc<StaticTransitProvider> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }

    /// Swap in `provider`, returning the snapshot it replaces.
    pub fn replace(&self, provider: StaticTransitProvider) -> Arc<StaticTransitProvider> {
        std::mem::replace(&mut *self.current.write(), Arc::new(provider))
    }

    /// Load through `loader` and swap the result in. On failure the current
    /// snapshot stays as it was.
    pub async fn reload(&self, loader: &DatasetLoader) -> Result<()> {
        let _guard = self.reloading.lock().await;
        match loader.load().await {
            Ok(provider) => {
                self.replace(provider);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(source = %loader.source(), %error, "dataset reload failed");
                Err(error)
            }
        }
    }
}

impl TransitQueries for TransitService {
    fn stop(&self, id: &str) -> Option<Arc<Stop>> {
        self.snapshot().stop(id)
    }

    fn route(&self, id: &str) -> Option<Arc<Route>> {
        self.snapshot().route(id)
    }

    fn stops_near(&self, query: &NearbyQuery) -> Vec<StopHit> {
        self.snapshot().stops_near(query)
    }

    fn nearest_stop(
        &self,
        lat: f64,
        lng: f64,
        radius_m: Option<f64>,
        operators: &[CompanyCode],
    ) -> Option<StopHit> {
        self.snapshot().nearest_stop(lat, lng, radius_m, operators)
    }

    fn routes_by_stop(&self, stop_id: &str, operators: &[CompanyCode]) -> Vec<Arc<Route>> {
        self.snapshot().routes_by_stop(stop_id, operators)
    }

    fn stops_by_route(&self, route_id: &str, operators: &[CompanyCode]) -> Vec<CompanyStops> {
        self.snapshot().stops_by_route(route_id, operators)
    }

    fn search_routes(&self, text: &str) -> Vec<RouteIdentifier> {
        self.snapshot().search_routes(text)
    }
}
