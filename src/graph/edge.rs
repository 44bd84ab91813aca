//! Edge type and related structures.
//!
//! Edges are directed connections between two stored nodes. Each edge has:
//! - A stable unique identifier
//! - Origin and destination node IDs
//! - An optional label, part of the edge's uniqueness key

use std::fmt;

use super::node::NodeId;

/// Stable edge identifier.
///
/// This ID remains valid even after other edges are removed from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// A borrowed view of a stored edge.
#[derive(Debug, PartialEq)]
pub struct Edge<'a, L> {
    pub id: EdgeId,
    pub origin: NodeId,
    pub destination: NodeId,
    pub content: Option<&'a L>,
}

impl<L> Clone for Edge<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Edge<'_, L> {}

impl<L> Edge<'_, L> {
    /// True when the edge starts and ends at the same node.
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.origin == self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(origin: u32, destination: u32) -> Edge<'static, String> {
        Edge {
            id: EdgeId(0),
            origin: NodeId(origin),
            destination: NodeId(destination),
            content: None,
        }
    }

    #[test]
    fn test_edge_id_display() {
        assert_eq!(format!("{}", EdgeId(42)), "Edge(42)");
    }

    #[test]
    fn test_self_loop() {
        assert!(!edge(1, 2).is_loop());
        assert!(edge(4, 4).is_loop());
    }
}
