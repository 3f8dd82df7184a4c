//! The query surface consumed by front ends.
//!
//! Implemented by the immutable snapshot (`StaticTransitProvider`) and by the
//! reloadable `TransitService`, which forwards to whichever snapshot is
//! current when the call starts.

use std::sync::Arc;

use crate::identifiers::*;
use crate::models::records::{Route, Stop};
use crate::relational::CompanyStops;
use crate::spatial::{default_operators, NearbyQuery, StopHit};

pub trait TransitQueries: Send + Sync {
    // ---- Lookups ----
    fn stop(&self, id: &str) -> Option<Arc<Stop>>;
    fn route(&self, id: &str) -> Option<Arc<Route>>;

    // ---- Spatial queries ----

    /// Stops around a point with adaptive radius expansion, closest first
    fn stops_near(&self, query: &NearbyQuery) -> Vec<StopHit>;

    /// The single closest stop, optionally bounded by `radius_m` (meters)
    fn nearest_stop(
        &self,
        lat: f64,
        lng: f64,
        radius_m: Option<f64>,
        operators: &[CompanyCode],
    ) -> Option<StopHit>;

    /// Closest stop anywhere, served by the default bus operators
    fn nearest_default_stop(&self, lat: f64, lng: f64) -> Option<StopHit> {
        self.nearest_stop(lat, lng, None, &default_operators())
    }

    // ---- Relational queries ----

    /// Routes that serve `stop_id` through at least one of `operators`
    fn routes_by_stop(&self, stop_id: &str, operators: &[CompanyCode]) -> Vec<Arc<Route>>;

    /// Ordered stop sequence of `route_id`, one entry per requested company
    fn stops_by_route(&self, route_id: &str, operators: &[CompanyCode]) -> Vec<CompanyStops>;

    /// Route IDs whose number or any served stop name contains `text`
    fn search_routes(&self, text: &str) -> Vec<RouteIdentifier>;
}
