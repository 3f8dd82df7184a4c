//! Shared test dataset.
//!
//! Distances from [`CENTER`] under the planar model:
//! E 10.2 m, A 11.1 m, B 51 m, C 111 m, D 204 m, G 3.3 m.
//! G has no route, F has no location, T1/T2 share a position ~11 km away,
//! J1/J2 sit ~5 km away on a jointly operated route.

use crate::models::Dataset;
use crate::provider::StaticTransitProvider;

pub const CENTER: (f64, f64) = (22.3, 114.1);

pub const PAYLOAD: &str = r#"{
    "stopList": {
        "A":  {"location": {"lat": 22.3001, "lng": 114.1},    "name": {"en": "Star Ferry", "zh": "天星碼頭"}},
        "B":  {"location": {"lat": 22.3,    "lng": 114.1005}, "name": {"en": "Café de Coral Plaza"}},
        "C":  {"location": {"lat": 22.301,  "lng": 114.1},    "name": {"en": "Mong Kok", "zh": "旺角"}},
        "D":  {"location": {"lat": 22.3,    "lng": 114.102},  "name": {"en": "Tai O", "zh": "大澳"}},
        "E":  {"location": {"lat": 22.3,    "lng": 114.1001}, "name": {"en": "Central Pier"}},
        "F":  {"name": {"en": "Unmapped"}},
        "G":  {"location": {"lat": 22.30003, "lng": 114.1},   "name": {"en": "Depot"}},
        "T1": {"location": {"lat": 22.4, "lng": 114.2}, "name": {"en": "Twin North"}},
        "T2": {"location": {"lat": 22.4, "lng": 114.2}, "name": {"en": "Twin South"}},
        "J1": {"location": {"lat": 22.35, "lng": 114.15}, "name": {"en": "Joint One"}},
        "J2": {"location": {"lat": 22.36, "lng": 114.16}, "name": {"en": "Joint Two"}}
    },
    "routeList": {
        "1+1+X+Y":   {"route": "1",   "co": ["kmb"], "serviceType": "1", "stops": {"kmb": ["A", "C", "E"]}},
        "2+1+X+Z":   {"route": "2",   "co": ["ctb"], "serviceType": "1", "stops": {"ctb": ["B", "A"]}},
        "3+1+P+Q":   {"route": "3",   "co": ["nlb"], "serviceType": "1", "stops": {"nlb": ["D", "GHOST"]}},
        "11+1+M+N":  {"route": "11",  "co": ["kmb"], "serviceType": "1", "stops": {"kmb": ["F", "E"]}},
        "101+1+K+L": {"route": "101", "co": ["kmb", "ctb"], "serviceType": "1",
                      "stops": {"kmb": ["J1"], "ctb": ["J1", "J2"]}}
    }
}"#;

pub fn dataset() -> Dataset {
    Dataset::from_slice(PAYLOAD.as_bytes()).unwrap()
}

pub fn provider() -> StaticTransitProvider {
    StaticTransitProvider::from_dataset(dataset())
}
