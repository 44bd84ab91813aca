//! Spatial indexing for pointer hit testing.
//!
//! This module provides an R-tree based spatial index over node positions
//! so that [`crate::simulation::ForceGraph::get_node_at`] does not have to
//! scan every node.

mod rtree;

pub use rtree::SpatialIndex;
