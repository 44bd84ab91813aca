//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) candidate lookup for pointer hit-testing. The index is a
//! snapshot: it must be rebuilt whenever node positions change.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geometry::Vector3;
use crate::graph::NodeId;

/// A point in the spatial index with associated node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    pub position: [f64; 3],
}

impl NodePoint {
    pub fn new(id: NodeId, position: Vector3) -> Self {
        Self {
            id,
            position: position.into(),
        }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Spatial index for graph nodes.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Find the nearest node to a point.
    pub fn nearest(&self, position: Vector3) -> Option<NodeId> {
        self.tree
            .nearest_neighbor(&position.into())
            .map(|point| point.id)
    }

    /// Find all nodes strictly closer than `radius` to a point.
    pub fn in_radius(&self, position: Vector3, radius: f64) -> Vec<NodeId> {
        let center: [f64; 3] = position.into();
        let radius_sq = radius * radius;
        // locate_within_distance is inclusive
        self.tree
            .locate_within_distance(center, radius_sq)
            .filter(|point| point.distance_2(&center) < radius_sq)
            .map(|point| point.id)
            .collect()
    }

    /// Rebuild the index from a list of (id, position) pairs.
    ///
    /// Bulk loading produces a better tree than incremental inserts.
    pub fn rebuild<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (NodeId, Vector3)>,
    {
        let node_points: Vec<_> = points
            .into_iter()
            .map(|(id, position)| NodePoint::new(id, position))
            .collect();

        self.tree = RTree::bulk_load(node_points);
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Get the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
