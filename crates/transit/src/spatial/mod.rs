//! Spatial indexing and query utilities.

pub mod index;
pub mod queries;

pub use queries::{
    default_operators, planar_distance, planar_distance_squared, NearbyQuery, SearchBox, StopHit,
    DEFAULT_OPERATORS,
};
