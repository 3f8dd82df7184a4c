//! The raw dataset: stop table and route table, in document order.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "stopList":  { "<stop id>":  { "location": { "lat": 22.3, "lng": 114.1 },
//!                                  "name": { "en": "...", "zh": "..." } } },
//!   "routeList": { "<route id>": { "route": "1", "co": ["kmb"],
//!                                  "orig": { ... }, "dest": { ... },
//!                                  "stops": { "kmb": ["<stop id>", ...] },
//!                                  "serviceType": "1", "bound": { "kmb": "O" } } }
//! }
//! ```
//!
//! Individual entries that don't decode are skipped; only a payload that is
//! not JSON, or lacks either table, fails the parse.

use std::collections::HashMap;
use std::sync::Arc;

use geo::Point;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::*;
use crate::models::records::{Route, Stop};
use crate::models::types::{LocalizedName, Result};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    stop_list: Map<String, Value>,
    route_list: Map<String, Value>,
}

#[derive(Default, Deserialize, Serialize)]
struct RawLocation {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
}

#[derive(Deserialize, Serialize)]
struct RawStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<RawLocation>,
    #[serde(default, deserialize_with = "null_as_default")]
    name: LocalizedName,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawRoute {
    #[serde(default, deserialize_with = "null_as_default")]
    route: String,
    #[serde(default, deserialize_with = "null_as_default")]
    co: Vec<CompanyCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    orig: LocalizedName,
    #[serde(default, deserialize_with = "null_as_default")]
    dest: LocalizedName,
    #[serde(default, deserialize_with = "null_as_default")]
    stops: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service_type: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    bound: Map<String, Value>,
}

/// An explicit `null` decodes like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn valid_location(raw: Option<RawLocation>) -> Option<Point> {
    let raw = raw?;
    let (lat, lng) = (raw.lat?, raw.lng?);
    let in_range = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);
    in_range.then(|| Point::new(lng, lat))
}

fn value_to_text(value: Value) -> Option<Arc<str>> {
    match value {
        Value::String(s) => Some(s.into()),
        Value::Number(n) => Some(n.to_string().into()),
        _ => None,
    }
}

impl RawStop {
    fn into_stop(self, id: StopIdentifier) -> Stop {
        let location = valid_location(self.location);
        if location.is_none() {
            tracing::debug!(stop = %id, "stop has no usable location");
        }
        Stop {
            id,
            location,
            name: self.name,
        }
    }

    fn from_stop(stop: &Stop) -> Self {
        Self {
            location: stop.location.map(|p| RawLocation {
                lat: Some(p.y()),
                lng: Some(p.x()),
            }),
            name: stop.name.clone(),
        }
    }
}

impl RawRoute {
    fn into_route(self, id: RouteIdentifier) -> Route {
        let stops = self
            .stops
            .into_iter()
            .filter_map(|(company, ids)| match ids {
                Value::Array(ids) => Some((
                    CompanyCode::new(company),
                    ids.into_iter()
                        .filter_map(|id| value_to_text(id).map(StopIdentifier::new))
                        .collect(),
                )),
                _ => {
                    tracing::debug!(route = %id, %company, "stop list is not an array");
                    None
                }
            })
            .collect();

        let bound = self
            .bound
            .into_iter()
            .filter_map(|(company, b)| value_to_text(b).map(|b| (CompanyCode::new(company), b)))
            .collect();

        Route {
            id,
            number: self.route.into(),
            companies: self.co,
            origin: self.orig,
            destination: self.dest,
            service_type: self.service_type.and_then(value_to_text),
            bound,
            stops,
        }
    }

    fn from_route(route: &Route) -> Self {
        Self {
            route: route.number.to_string(),
            co: route.companies.clone(),
            orig: route.origin.clone(),
            dest: route.destination.clone(),
            stops: route
                .stops
                .iter()
                .map(|(co, ids)| {
                    let ids = ids.iter().map(|id| Value::String(id.to_string())).collect();
                    (co.to_string(), Value::Array(ids))
                })
                .collect(),
            service_type: route
                .service_type
                .as_ref()
                .map(|s| Value::String(s.to_string())),
            bound: route
                .bound
                .iter()
                .map(|(co, b)| (co.to_string(), Value::String(b.to_string())))
                .collect(),
        }
    }
}

/// Stop and route tables for one load. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    stops: Vec<Arc<Stop>>,
    stop_slots: HashMap<StopIdentifier, usize>,
    routes: Vec<Arc<Route>>,
    route_slots: HashMap<RouteIdentifier, usize>,
}

impl Dataset {
    /// Build from already-decoded records. On duplicate IDs the first entry
    /// is kept.
    pub fn new(stops: Vec<Stop>, routes: Vec<Route>) -> Self {
        let mut dataset = Self::default();

        for stop in stops {
            if dataset.stop_slots.contains_key(&stop.id) {
                tracing::debug!(stop = %stop.id, "duplicate stop id ignored");
                continue;
            }
            dataset.stop_slots.insert(stop.id.clone(), dataset.stops.len());
            dataset.stops.push(Arc::new(stop));
        }

        for route in routes {
            if dataset.route_slots.contains_key(&route.id) {
                tracing::debug!(route = %route.id, "duplicate route id ignored");
                continue;
            }
            dataset.route_slots.insert(route.id.clone(), dataset.routes.len());
            dataset.routes.push(Arc::new(route));
        }

        dataset
    }

    /// Parse a JSON payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawDataset = serde_json::from_slice(bytes)?;

        let stops = raw
            .stop_list
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value::<RawStop>(value) {
                Ok(stop) => Some(stop.into_stop(StopIdentifier::new(id))),
                Err(error) => {
                    tracing::debug!(stop = %id, %error, "skipping malformed stop");
                    None
                }
            })
            .collect();

        let routes = raw
            .route_list
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value::<RawRoute>(value) {
                Ok(route) => Some(route.into_route(RouteIdentifier::new(id))),
                Err(error) => {
                    tracing::debug!(route = %id, %error, "skipping malformed route");
                    None
                }
            })
            .collect();

        Ok(Self::new(stops, routes))
    }

    /// Serialize back to the wire shape (used for the cache write).
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut stop_list = Map::with_capacity(self.stops.len());
        for stop in &self.stops {
            stop_list.insert(stop.id.to_string(), serde_json::to_value(RawStop::from_stop(stop))?);
        }

        let mut route_list = Map::with_capacity(self.routes.len());
        for route in &self.routes {
            route_list.insert(route.id.to_string(), serde_json::to_value(RawRoute::from_route(route))?);
        }

        Ok(serde_json::to_vec(&RawDataset { stop_list, route_list })?)
    }

    pub fn stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn stop(&self, id: &str) -> Option<&Arc<Stop>> {
        self.stop_slots.get(id).map(|&slot| &self.stops[slot])
    }

    pub fn route(&self, id: &str) -> Option<&Arc<Route>> {
        self.route_slots.get(id).map(|&slot| &self.routes[slot])
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty() && self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "stopList": {
            "S2": {"location": {"lat": 22.31, "lng": 114.17}, "name": {"en": "Mong Kok", "zh": "旺角"}},
            "S1": {"location": {"lat": 22.29, "lng": 114.16}, "name": {"en": "Central"}},
            "S3": {"name": {"en": "Nowhere"}},
            "S4": "garbage"
        },
        "routeList": {
            "1+1+A+B": {
                "route": "1", "co": ["kmb"], "serviceType": 1,
                "orig": {"en": "A"}, "dest": {"en": "B"},
                "stops": {"kmb": ["S2", "S1", "GONE"]},
                "bound": {"kmb": "O"},
                "fares": ["4.5"]
            },
            "2+1+C+D": {"route": "2", "co": ["ctb"], "stops": {}}
        }
    }"#;

    #[test]
    fn test_parse_keeps_document_order() {
        let dataset = Dataset::from_slice(PAYLOAD.as_bytes()).unwrap();
        let ids: Vec<_> = dataset.stops().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S2", "S1", "S3"]);
        assert_eq!(dataset.routes().len(), 2);
    }

    #[test]
    fn test_parse_tolerates_missing_location() {
        let dataset = Dataset::from_slice(PAYLOAD.as_bytes()).unwrap();
        assert!(dataset.stop("S3").unwrap().location.is_none());
        assert_eq!(dataset.stop("S1").unwrap().latitude(), Some(22.29));
        assert!(dataset.stop("S4").is_none());
    }

    #[test]
    fn test_parse_treats_null_fields_as_absent() {
        let payload = br#"{
            "stopList": {
                "S1": {"location": {"lat": 22.3, "lng": 114.1}, "name": null}
            },
            "routeList": {
                "9+1+A+B": {
                    "route": "9", "co": null, "orig": null, "dest": null,
                    "stops": {"kmb": ["S1"]}, "bound": null, "serviceType": null
                },
                "10+1+A+B": {"route": null, "stops": null}
            }
        }"#;
        let dataset = Dataset::from_slice(payload).unwrap();

        let stop = dataset.stop("S1").unwrap();
        assert!(stop.location.is_some());
        assert!(stop.name.is_empty());

        let route = dataset.route("9+1+A+B").unwrap();
        assert!(route.origin.is_empty());
        assert!(route.destination.is_empty());
        assert!(route.companies.is_empty());
        assert_eq!(route.service_type, None);
        assert_eq!(route.stops_for("kmb").unwrap().len(), 1);

        let bare = dataset.route("10+1+A+B").unwrap();
        assert_eq!(&*bare.number, "");
        assert!(!bare.has_stop_data());
    }

    #[test]
    fn test_parse_route_fields() {
        let dataset = Dataset::from_slice(PAYLOAD.as_bytes()).unwrap();
        let route = dataset.route("1+1+A+B").unwrap();
        assert_eq!(&*route.number, "1");
        assert_eq!(route.service_type.as_deref(), Some("1"));
        assert_eq!(route.bound_for("kmb"), Some("O"));
        assert_eq!(route.stops_for("kmb").unwrap().len(), 3);
        assert!(!dataset.route("2+1+C+D").unwrap().has_stop_data());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(Dataset::from_slice(b"not json").is_err());
        assert!(Dataset::from_slice(br#"{"stopList": {}}"#).is_err());
    }

    #[test]
    fn test_reserialized_payload_parses_to_same_tables() {
        let dataset = Dataset::from_slice(PAYLOAD.as_bytes()).unwrap();
        let reparsed = Dataset::from_slice(&dataset.to_vec().unwrap()).unwrap();

        assert_eq!(dataset.stops(), reparsed.stops());
        assert_eq!(dataset.routes(), reparsed.routes());
    }
}
