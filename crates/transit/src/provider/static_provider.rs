//! In-memory snapshot: one dataset plus everything derived from it.
//!
//! A snapshot is built once from a parsed [`Dataset`] and never mutated.
//! Reloading produces a new snapshot (see [`super::service`]).

use std::sync::Arc;

use rstar::RTree;

use crate::identifiers::*;
use crate::models::{Dataset, Route, Stop, TransitQueries};
use crate::relational::{self, CompanyStops};
use crate::reverse_index::ReverseIndex;
use crate::spatial::index::{build_stop_tree, StopNode};
use crate::spatial::queries::{self, NearbyQuery, StopHit};

/// Dataset, reverse indices and stop R-tree for one load.
///
/// The flattened stop array is the dataset's own `Vec<Arc<Stop>>`; the tree
/// and the indices refer back into it by slot.
#[derive(Default)]
pub struct StaticTransitProvider {
    dataset: Dataset,
    index: ReverseIndex,
    stop_tree: RTree<StopNode>,
}

impl StaticTransitProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the indices for `dataset`.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let index = ReverseIndex::build(&dataset);
        let stop_tree = build_stop_tree(dataset.stops());

        tracing::debug!(
            stops = dataset.stops().len(),
            positioned = stop_tree.size(),
            routes = dataset.routes().len(),
            indexed_stops = index.indexed_stops(),
            "built transit indices"
        );

        Self {
            dataset,
            index,
            stop_tree,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn reverse_index(&self) -> &ReverseIndex {
        &self.index
    }

    /// Flattened stop array, in dataset order.
    pub fn stops(&self) -> &[Arc<Stop>] {
        self.dataset.stops()
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        self.dataset.routes()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn search_routes_by_number(&self, text: &str) -> Vec<RouteIdentifier> {
        relational::search_routes_by_number(&self.dataset, text)
    }

    pub fn search_routes_by_stop_name(&self, text: &str) -> Vec<RouteIdentifier> {
        relational::search_routes_by_stop_name(&self.dataset, &self.index, text)
    }
}

impl TransitQueries for StaticTransitProvider {
    fn stop(&self, id: &str) -> Option<Arc<Stop>> {
        self.dataset.stop(id).cloned()
    }

    fn route(&self, id: &str) -> Option<Arc<Route>> {
        self.dataset.route(id).cloned()
    }

    fn stops_near(&self, query: &NearbyQuery) -> Vec<StopHit> {
        queries::stops_near(self.dataset.stops(), &self.stop_tree, &self.index, query)
    }

    fn nearest_stop(
        &self,
        lat: f64,
        lng: f64,
        radius_m: Option<f64>,
        operators: &[CompanyCode],
    ) -> Option<StopHit> {
        queries::nearest_stop(self.dataset.stops(), &self.index, lat, lng, radius_m, operators)
    }

    fn routes_by_stop(&self, stop_id: &str, operators: &[CompanyCode]) -> Vec<Arc<Route>> {
        relational::routes_by_stop(&self.dataset, &self.index, stop_id, operators)
    }

    fn stops_by_route(&self, route_id: &str, operators: &[CompanyCode]) -> Vec<CompanyStops> {
        relational::stops_by_route(&self.dataset, route_id, operators)
    }

    fn search_routes(&self, text: &str) -> Vec<RouteIdentifier> {
        relational::search_routes(&self.dataset, &self.index, text)
    }
}
