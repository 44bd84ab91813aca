//! Graph data structures and operations.
//!
//! This module provides a generic directed graph keyed by node identity,
//! backed by petgraph's StableGraph for stable node/edge indices. It knows
//! nothing about physics; [`crate::simulation::ForceGraph`] layers the
//! simulation state on top of it.

mod edge;
mod engine;
mod node;

pub use edge::{Edge, EdgeId};
pub use engine::Graph;
pub use node::{Identity, NodeId};
