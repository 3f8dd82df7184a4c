//! Stop ↔ route lookups and free-text route search.

pub mod text;

use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{Dataset, Route, Stop};
use crate::reverse_index::ReverseIndex;

use self::text::Needle;

/// One position in a route's stop sequence.
///
/// IDs that don't resolve against the stop table are kept as `Missing` so
/// the sequence keeps its length and positions.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteStop {
    Known(Arc<Stop>),
    Missing(StopIdentifier),
}

impl RouteStop {
    pub fn id(&self) -> &StopIdentifier {
        match self {
            Self::Known(stop) => &stop.id,
            Self::Missing(id) => id,
        }
    }

    pub fn stop(&self) -> Option<&Arc<Stop>> {
        match self {
            Self::Known(stop) => Some(stop),
            Self::Missing(_) => None,
        }
    }
}

/// A company's ordered stop sequence on one route.
#[derive(Clone, Debug, PartialEq)]
pub struct CompanyStops {
    pub company: CompanyCode,
    pub stops: Vec<RouteStop>,
}

pub(crate) fn routes_by_stop(
    dataset: &Dataset,
    index: &ReverseIndex,
    stop_id: &str,
    operators: &[CompanyCode],
) -> Vec<Arc<Route>> {
    // The index merges every company; re-check against the route's own lists
    // so a route reachable only through a filtered-out company is dropped.
    index
        .route_slots(stop_id)
        .iter()
        .map(|&slot| &dataset.routes()[slot])
        .filter(|route| route.lists_stop(stop_id, operators))
        .cloned()
        .collect()
}

pub(crate) fn stops_by_route(
    dataset: &Dataset,
    route_id: &str,
    operators: &[CompanyCode],
) -> Vec<CompanyStops> {
    let Some(route) = dataset.route(route_id) else {
        return Vec::new();
    };

    let companies: Vec<&CompanyCode> = if operators.is_empty() {
        route.stops.iter().map(|(co, _)| co).collect()
    } else {
        let mut requested: Vec<&CompanyCode> = Vec::with_capacity(operators.len());
        for co in operators {
            if !requested.contains(&co) {
                requested.push(co);
            }
        }
        requested
    };

    companies
        .into_iter()
        .filter_map(|company| {
            let ids = route.stops_for(company.as_str())?;
            let stops = ids
                .iter()
                .map(|id| match dataset.stop(id.as_str()) {
                    Some(stop) => RouteStop::Known(stop.clone()),
                    None => {
                        tracing::debug!(route = %route.id, stop = %id, "dangling stop reference");
                        RouteStop::Missing(id.clone())
                    }
                })
                .collect();
            Some(CompanyStops {
                company: company.clone(),
                stops,
            })
        })
        .collect()
}

/// Collects matched route slots and emits their IDs in dataset order.
struct RouteMatches<'a> {
    dataset: &'a Dataset,
    hits: Vec<bool>,
}

impl<'a> RouteMatches<'a> {
    fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            hits: vec![false; dataset.routes().len()],
        }
    }

    fn by_number(&mut self, needle: &Needle) {
        for (slot, route) in self.dataset.routes().iter().enumerate() {
            if needle.matches(&route.number) {
                self.hits[slot] = true;
            }
        }
    }

    fn by_stop_name(&mut self, index: &ReverseIndex, needle: &Needle) {
        for stop in self.dataset.stops() {
            if stop.name.variants().any(|name| needle.matches(name)) {
                for &slot in index.route_slots(stop.id.as_str()) {
                    self.hits[slot] = true;
                }
            }
        }
    }

    fn finish(self) -> Vec<RouteIdentifier> {
        self.dataset
            .routes()
            .iter()
            .zip(self.hits)
            .filter(|(_, hit)| *hit)
            .map(|(route, _)| route.id.clone())
            .collect()
    }
}

pub(crate) fn search_routes_by_number(dataset: &Dataset, text: &str) -> Vec<RouteIdentifier> {
    let Some(needle) = Needle::new(text) else {
        return Vec::new();
    };
    let mut matches = RouteMatches::new(dataset);
    matches.by_number(&needle);
    matches.finish()
}

pub(crate) fn search_routes_by_stop_name(
    dataset: &Dataset,
    index: &ReverseIndex,
    text: &str,
) -> Vec<RouteIdentifier> {
    let Some(needle) = Needle::new(text) else {
        return Vec::new();
    };
    let mut matches = RouteMatches::new(dataset);
    matches.by_stop_name(index, &needle);
    matches.finish()
}

pub(crate) fn search_routes(dataset: &Dataset, index: &ReverseIndex, text: &str) -> Vec<RouteIdentifier> {
    let Some(needle) = Needle::new(text) else {
        return Vec::new();
    };
    let mut matches = RouteMatches::new(dataset);
    matches.by_number(&needle);
    matches.by_stop_name(index, &needle);
    matches.finish()
}
