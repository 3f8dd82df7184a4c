//! Stop and route records as held in memory after parsing.

use std::sync::Arc;

use geo::Point;

use crate::identifiers::*;
use crate::models::types::LocalizedName;

/// A single boarding point.
///
/// `location` is `None` when the dataset entry had no usable position; such
/// stops still resolve by ID but never show up in spatial queries.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopIdentifier,
    /// x = longitude, y = latitude (WGS-84 degrees)
    pub location: Option<Point>,
    pub name: LocalizedName,
}

impl Stop {
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|p| p.y())
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|p| p.x())
    }
}

/// A directional route with one ordered stop sequence per operating company.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteIdentifier,
    /// Display number, e.g. "1A", "N8X"
    pub number: Arc<str>,
    pub companies: Vec<CompanyCode>,
    pub origin: LocalizedName,
    pub destination: LocalizedName,
    pub service_type: Option<Arc<str>>,
    /// Per-company direction code ("O" outbound, "I" inbound)
    pub bound: Vec<(CompanyCode, Arc<str>)>,
    /// Per-company stop visiting order
    pub stops: Vec<(CompanyCode, Vec<StopIdentifier>)>,
}

impl Route {
    /// Stop sequence for one company, if that company has stop data here.
    pub fn stops_for(&self, company: &str) -> Option<&[StopIdentifier]> {
        self.stops
            .iter()
            .find(|(co, _)| co.as_str() == company)
            .map(|(_, ids)| ids.as_slice())
    }

    pub fn bound_for(&self, company: &str) -> Option<&str> {
        self.bound
            .iter()
            .find(|(co, _)| co.as_str() == company)
            .map(|(_, bound)| &**bound)
    }

    pub fn has_stop_data(&self) -> bool {
        self.stops.iter().any(|(_, ids)| !ids.is_empty())
    }

    /// Whether any of `operators` lists `stop` in its own sequence for this
    /// route. An empty operator list matches any company.
    pub fn lists_stop(&self, stop: &str, operators: &[CompanyCode]) -> bool {
        self.stops
            .iter()
            .filter(|(co, _)| operators.is_empty() || operators.contains(co))
            .any(|(_, ids)| ids.iter().any(|id| id.as_str() == stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Route {
        Route {
            id: RouteIdentifier::new("101+1+KENNEDY TOWN+KWUN TONG"),
            number: "101".into(),
            companies: vec![CompanyCode::new("kmb"), CompanyCode::new("ctb")],
            origin: LocalizedName::new([("en", "KENNEDY TOWN")]),
            destination: LocalizedName::new([("en", "KWUN TONG")]),
            service_type: Some("1".into()),
            bound: vec![(CompanyCode::new("kmb"), "O".into())],
            stops: vec![
                (CompanyCode::new("kmb"), vec!["S1".into(), "S2".into()]),
                (CompanyCode::new("ctb"), vec!["S2".into(), "S3".into()]),
            ],
        }
    }

    #[test]
    fn test_stops_for_company() {
        let route = route();
        assert_eq!(route.stops_for("ctb").map(|s| s.len()), Some(2));
        assert!(route.stops_for("nlb").is_none());
        assert_eq!(route.bound_for("kmb"), Some("O"));
        assert!(route.has_stop_data());
    }

    #[test]
    fn test_lists_stop_respects_operators() {
        let route = route();
        assert!(route.lists_stop("S3", &[]));
        assert!(route.lists_stop("S3", &[CompanyCode::new("ctb")]));
        assert!(!route.lists_stop("S3", &[CompanyCode::new("kmb")]));
        assert!(!route.lists_stop("S9", &[]));
    }
}
