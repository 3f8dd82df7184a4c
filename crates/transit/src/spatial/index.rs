//! R-tree nodes for spatial indexing.
//!
//! Each node points back into the flattened stop array by slot, so results can
//! be ordered by dataset position when distances tie. Stops without a location
//! are never inserted.
//!
//! ## Two-Stage Filtering
//!
//! The radius search uses a two-stage filter:
//! 1. **R-tree filter**: envelope lookup on a latitude/longitude box
//! 2. **Planar filter**: exact squared distance in the local planar model
//!    (see [`super::queries`]) on the surviving nodes

use std::sync::Arc;

use geo::Point;
use rstar::{RTree, RTreeObject, AABB};

use crate::models::Stop;
use crate::spatial::queries::SearchBox;

#[derive(Clone, Debug, PartialEq)]
pub struct StopNode {
    /// Position in the flattened stop array
    pub slot: usize,
    point: [f64; 2],
}

impl StopNode {
    pub fn new(slot: usize, location: Point) -> Self {
        Self {
            slot,
            point: [location.x(), location.y()],
        }
    }

    pub fn location(&self) -> Point {
        Point::new(self.point[0], self.point[1])
    }
}

impl RTreeObject for StopNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl SearchBox {
    pub fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners(
            [self.min_lng, self.min_lat],
            [self.max_lng, self.max_lat],
        )
    }
}

/// Bulk-load every positioned stop.
pub fn build_stop_tree(stops: &[Arc<Stop>]) -> RTree<StopNode> {
    RTree::bulk_load(
        stops
            .iter()
            .enumerate()
            .filter_map(|(slot, stop)| stop.location.map(|p| StopNode::new(slot, p)))
            .collect(),
    )
}
