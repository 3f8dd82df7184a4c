//! Reverse indices derived from the route table.
//!
//! Built in two phases: growable maps filled during one pass over every
//! route's per-company stop lists, then frozen into boxed slices. Nothing is
//! mutable after [`ReverseIndex::build`] returns.

use std::collections::HashMap;

use crate::identifiers::*;
use crate::models::Dataset;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReverseIndex {
    /// stop → route slots (into `Dataset::routes`), first-visit order
    stop_routes: HashMap<StopIdentifier, Box<[usize]>>,
    /// stop → companies serving it, sorted and de-duplicated
    stop_operators: HashMap<StopIdentifier, Box<[CompanyCode]>>,
}

impl ReverseIndex {
    pub fn build(dataset: &Dataset) -> Self {
        let mut stop_routes: HashMap<StopIdentifier, Vec<usize>> = HashMap::new();
        let mut stop_operators: HashMap<StopIdentifier, Vec<CompanyCode>> = HashMap::new();

        for (slot, route) in dataset.routes().iter().enumerate() {
            if !route.has_stop_data() {
                tracing::debug!(route = %route.id, "route has no stop data");
                continue;
            }

            for (company, stops) in &route.stops {
                for stop in stops {
                    // Routes are visited in slot order, so a repeat of the
                    // current route can only ever be the last entry.
                    let routes = stop_routes.entry(stop.clone()).or_default();
                    if routes.last() != Some(&slot) {
                        routes.push(slot);
                    }

                    stop_operators
                        .entry(stop.clone())
                        .or_default()
                        .push(company.clone());
                }
            }
        }

        Self {
            stop_routes: stop_routes
                .into_iter()
                .map(|(stop, routes)| (stop, routes.into_boxed_slice()))
                .collect(),
            stop_operators: stop_operators
                .into_iter()
                .map(|(stop, mut companies)| {
                    companies.sort_unstable();
                    companies.dedup();
                    (stop, companies.into_boxed_slice())
                })
                .collect(),
        }
    }

    /// Route slots visiting `stop`; empty for unknown stops.
    pub fn route_slots(&self, stop: &str) -> &[usize] {
        self.stop_routes.get(stop).map(|r| &r[..]).unwrap_or_default()
    }

    /// Companies serving `stop`, or `None` if no route lists it.
    pub fn operators(&self, stop: &str) -> Option<&[CompanyCode]> {
        self.stop_operators.get(stop).map(|c| &c[..])
    }

    /// Operator filter shared by every query: an empty filter admits all
    /// stops, otherwise the stop needs an index entry that intersects it.
    pub fn served_by_any(&self, stop: &str, operators: &[CompanyCode]) -> bool {
        if operators.is_empty() {
            return true;
        }
        self.operators(stop)
            .is_some_and(|served| served.iter().any(|co| operators.contains(co)))
    }

    pub fn indexed_stops(&self) -> usize {
        self.stop_routes.len()
    }
}
