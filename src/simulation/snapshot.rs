//! Owned, serializable view of a [`ForceGraph`] for renderers.

use std::fmt::Display;

use serde::Serialize;

use super::force_graph::ForceGraph;
use crate::geometry::Vector3;
use crate::graph::{Identity, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub key: String,
    pub position: Vector3,
    pub velocity: Vector3,
    pub radius: f64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub origin: String,
    pub destination: String,
    pub content: Option<String>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub tick: u64,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl<C, L> ForceGraph<C, L>
where
    C: Identity,
    L: PartialEq + Display,
{
    pub fn snapshot(&self) -> GraphSnapshot {
        let key_of = |id: NodeId| {
            self.graph()
                .node(id)
                .map(|n| n.identity())
                .unwrap_or_default()
        };

        GraphSnapshot {
            tick: self.ticks(),
            nodes: self
                .nodes()
                .map(|(_, n)| NodeView {
                    key: n.identity(),
                    position: n.position,
                    velocity: n.velocity,
                    radius: n.radius,
                    enabled: n.enabled,
                })
                .collect(),
            edges: self
                .edges()
                .map(|e| EdgeView {
                    origin: key_of(e.origin),
                    destination: key_of(e.destination),
                    content: e.content.map(ToString::to_string),
                })
                .collect(),
        }
    }
}
