//! Stop proximity search.
//!
//! Distances use a local planar approximation: degree offsets are scaled by
//! fixed meters-per-degree constants calibrated for Hong Kong (~22.3°N). This
//! is only meaningful over a few kilometers, and result ordering depends on
//! it exactly, so it must not be swapped for a geodesic formula.

use std::sync::Arc;

use geo::Point;
use rstar::RTree;

use crate::identifiers::CompanyCode;
use crate::models::Stop;
use crate::reverse_index::ReverseIndex;
use crate::spatial::index::StopNode;

pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;
pub const METERS_PER_DEGREE_LNG: f64 = 102_000.0;

/// The two principal bus operators, used when a query names none.
pub const DEFAULT_OPERATORS: [&str; 2] = ["kmb", "ctb"];

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_MIN_RESULTS: usize = 2;

pub fn default_operators() -> Vec<CompanyCode> {
    DEFAULT_OPERATORS.iter().map(|&co| CompanyCode::new(co)).collect()
}

/// Squared planar distance in m² between `(lat, lng)` and `point`.
pub fn planar_distance_squared(lat: f64, lng: f64, point: Point) -> f64 {
    let dy = (point.y() - lat) * METERS_PER_DEGREE_LAT;
    let dx = (point.x() - lng) * METERS_PER_DEGREE_LNG;
    dx * dx + dy * dy
}

/// Planar distance in meters.
pub fn planar_distance(lat: f64, lng: f64, point: Point) -> f64 {
    planar_distance_squared(lat, lng, point).sqrt()
}

/// Latitude/longitude box extending `half_extent_m` meters on each side of a
/// center point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl SearchBox {
    pub fn around(lat: f64, lng: f64, half_extent_m: f64) -> Self {
        let dlat = half_extent_m / METERS_PER_DEGREE_LAT;
        let dlng = half_extent_m / METERS_PER_DEGREE_LNG;
        Self {
            min_lat: lat - dlat,
            max_lat: lat + dlat,
            min_lng: lng - dlng,
            max_lng: lng + dlng,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.y())
            && (self.min_lng..=self.max_lng).contains(&point.x())
    }
}

/// A stop returned by a proximity query, with its planar distance.
#[derive(Clone, Debug, PartialEq)]
pub struct StopHit {
    pub stop: Arc<Stop>,
    pub distance_m: f64,
}

/// Parameters for [`stops_near`].
///
/// ```
/// use busmap_transit::spatial::NearbyQuery;
///
/// let query = NearbyQuery::new(22.3, 114.1, 60.0).with_max_results(2);
/// assert_eq!(query.min_results, 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
    pub max_results: usize,
    pub min_results: usize,
    /// Empty means no operator filtering
    pub operators: Vec<CompanyCode>,
}

impl NearbyQuery {
    pub fn new(lat: f64, lng: f64, radius_m: f64) -> Self {
        Self {
            lat,
            lng,
            radius_m,
            max_results: DEFAULT_MAX_RESULTS,
            min_results: DEFAULT_MIN_RESULTS,
            operators: default_operators(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_results(mut self, min_results: usize) -> Self {
        self.min_results = min_results;
        self
    }

    pub fn with_operators(mut self, operators: impl IntoIterator<Item = CompanyCode>) -> Self {
        self.operators = operators.into_iter().collect();
        self
    }

    fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.radius_m.is_finite() && self.radius_m >= 0.0
    }
}

/// Adaptive radius search.
///
/// Candidates are stops within 4× the radius, closest first (ties keep
/// flattened order). The result is cut at the first radius in 1×, 2× that
/// holds at least `min_results` candidates; failing both, the 4× candidates
/// are returned as-is, which may be fewer than `min_results`.
pub(crate) fn stops_near(
    stops: &[Arc<Stop>],
    tree: &RTree<StopNode>,
    index: &ReverseIndex,
    query: &NearbyQuery,
) -> Vec<StopHit> {
    if stops.is_empty() || !query.is_valid() {
        return Vec::new();
    }

    let outer_m = query.radius_m * 4.0;
    let outer_2 = outer_m * outer_m;
    let bbox = SearchBox::around(query.lat, query.lng, outer_m);

    let mut candidates: Vec<(f64, usize)> = tree
        .locate_in_envelope(&bbox.envelope())
        .filter(|node| index.served_by_any(stops[node.slot].id.as_str(), &query.operators))
        .filter_map(|node| {
            let d2 = planar_distance_squared(query.lat, query.lng, node.location());
            (d2 <= outer_2).then_some((d2, node.slot))
        })
        .collect();

    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let within = |radius_m: f64| {
        let r2 = radius_m * radius_m;
        candidates.partition_point(|&(d2, _)| d2 <= r2)
    };

    let inner = within(query.radius_m);
    let count = if inner >= query.min_results {
        inner
    } else {
        let doubled = within(query.radius_m * 2.0);
        if doubled >= query.min_results {
            doubled
        } else {
            candidates.len()
        }
    };

    candidates
        .into_iter()
        .take(count.min(query.max_results))
        .map(|(d2, slot)| StopHit {
            stop: stops[slot].clone(),
            distance_m: d2.sqrt(),
        })
        .collect()
}

/// Single linear pass for the closest stop. `radius_m` of `None` (or
/// infinity) means unbounded; a finite radius also enables a box pre-filter.
pub(crate) fn nearest_stop(
    stops: &[Arc<Stop>],
    index: &ReverseIndex,
    lat: f64,
    lng: f64,
    radius_m: Option<f64>,
    operators: &[CompanyCode],
) -> Option<StopHit> {
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    let bounds = match radius_m {
        Some(r) if r.is_nan() || r < 0.0 => return None,
        Some(r) if r.is_finite() => Some((SearchBox::around(lat, lng, r), r * r)),
        _ => None,
    };

    let mut best: Option<(f64, usize)> = None;
    for (slot, stop) in stops.iter().enumerate() {
        let Some(location) = stop.location else {
            continue;
        };
        if let Some((bbox, _)) = &bounds {
            if !bbox.contains(location) {
                continue;
            }
        }
        if !index.served_by_any(stop.id.as_str(), operators) {
            continue;
        }

        let d2 = planar_distance_squared(lat, lng, location);
        if bounds.is_some_and(|(_, r2)| d2 > r2) {
            continue;
        }
        if best.map_or(true, |(best_d2, _)| d2 < best_d2) {
            best = Some((d2, slot));
        }
    }

    best.map(|(d2, slot)| StopHit {
        stop: stops[slot].clone(),
        distance_m: d2.sqrt(),
    })
}
