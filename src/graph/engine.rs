//! Graph - generic directed graph container.
//!
//! Topology lives in petgraph's StableGraph so node and edge indices survive
//! removals, and iteration never observes the holes those removals leave.
//! StableGraph recycles freed slots, so index order is not insertion order;
//! an [`InsertionOrder`] per collection restores it for iteration.
//! Nodes are additionally keyed by their [`Identity`] string, which is what
//! makes insertion idempotent.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use log::debug;
use petgraph::{Directed, Direction};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use super::edge::{Edge, EdgeId};
use super::node::{Identity, NodeId};

/// Insertion sequence over slot indices that petgraph may hand out again.
struct InsertionOrder<I> {
    next: u64,
    by_seq: BTreeMap<u64, I>,
    seq_of: HashMap<I, u64>,
}

impl<I: Copy + Eq + Hash> InsertionOrder<I> {
    fn new() -> Self {
        Self {
            next: 0,
            by_seq: BTreeMap::new(),
            seq_of: HashMap::new(),
        }
    }

    fn push(&mut self, index: I) {
        let seq = self.next;
        self.next += 1;
        self.by_seq.insert(seq, index);
        self.seq_of.insert(index, seq);
    }

    fn remove(&mut self, index: I) {
        if let Some(seq) = self.seq_of.remove(&index) {
            self.by_seq.remove(&seq);
        }
    }

    fn rank(&self, index: I) -> Option<u64> {
        self.seq_of.get(&index).copied()
    }

    fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.by_seq.values().copied()
    }

    fn clear(&mut self) {
        self.by_seq.clear();
        self.seq_of.clear();
    }
}

/// A directed multigraph of uniquely keyed nodes.
///
/// Parallel edges between the same ordered pair are allowed only when their
/// labels differ: the uniqueness key of an edge is
/// `(origin, destination, label)`. Nodes and edges iterate in insertion
/// order.
pub struct Graph<N, L = String> {
    /// The underlying graph structure.
    graph: StableGraph<N, Option<L>, Directed>,

    /// Map from identity key to petgraph NodeIndex
    key_to_index: HashMap<String, NodeIndex>,

    node_order: InsertionOrder<NodeIndex>,
    edge_order: InsertionOrder<EdgeIndex>,
}

#[inline]
fn node_id(index: NodeIndex) -> NodeId {
    NodeId(index.index() as u32)
}

#[inline]
fn node_index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.0 as usize)
}

#[inline]
fn edge_id(index: EdgeIndex) -> EdgeId {
    EdgeId(index.index() as u32)
}

impl<N, L> Graph<N, L>
where
    N: Identity,
    L: PartialEq,
{
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            key_to_index: HashMap::new(),
            node_order: InsertionOrder::new(),
            edge_order: InsertionOrder::new(),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Insert `node` unless a node with the same identity is already stored.
    ///
    /// Returns the ID of the stored node, which is the pre-existing one when
    /// the key was taken (the new value is dropped). A node with an empty
    /// identity is ignored and yields `None`.
    pub fn add_node(&mut self, node: N) -> Option<NodeId> {
        let key = node.identity();
        if key.is_empty() {
            debug!("Ignoring node with empty identity");
            return None;
        }
        if let Some(&index) = self.key_to_index.get(&key) {
            return Some(node_id(index));
        }

        let index = self.graph.add_node(node);
        debug!(key = key.as_str(), id = index.index(); "Added node");
        self.key_to_index.insert(key, index);
        self.node_order.push(index);
        Some(node_id(index))
    }

    /// Remove the node stored under `key` together with every edge touching it.
    ///
    /// Returns the removed node, or `None` if no such node exists.
    pub fn rem_node(&mut self, key: &str) -> Option<N> {
        let index = self.key_to_index.remove(key)?;
        // a self-loop shows up in both directions; removing it twice is a no-op
        let cascaded: Vec<EdgeIndex> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        debug!(key = key, cascaded_edges = cascaded.len(); "Removing node");
        for edge in cascaded {
            self.edge_order.remove(edge);
        }
        self.node_order.remove(index);
        self.graph.remove_node(index)
    }

    /// Look up a node by identity key.
    pub fn get_node(&self, key: &str) -> Option<&N> {
        self.key_to_index
            .get(key)
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// Look up a node by identity key for mutation.
    pub fn get_node_mut(&mut self, key: &str) -> Option<&mut N> {
        let index = *self.key_to_index.get(key)?;
        self.graph.node_weight_mut(index)
    }

    /// The ID of the node stored under `key`.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.key_to_index.get(key).map(|&index| node_id(index))
    }

    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.graph.node_weight(node_index(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.graph.node_weight_mut(node_index(id))
    }

    /// Check whether a node with `key` is stored.
    pub fn contains_node(&self, key: &str) -> bool {
        self.key_to_index.contains_key(key)
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> {
        self.node_order
            .iter()
            .filter_map(|index| self.graph.node_weight(index).map(|n| (node_id(index), n)))
    }

    /// Position of a node in insertion order; earlier nodes rank lower.
    ///
    /// Ranks are never reused, unlike IDs.
    pub fn node_rank(&self, id: NodeId) -> Option<u64> {
        self.node_order.rank(node_index(id))
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Insert both endpoints (idempotently) and an edge between them.
    ///
    /// Returns the existing edge when the `(origin, destination, label)`
    /// triple is already present, and `None` when either endpoint has an
    /// empty identity.
    pub fn add_edge(&mut self, origin: N, destination: N, label: Option<L>) -> Option<EdgeId> {
        let origin = self.add_node(origin)?;
        let destination = self.add_node(destination)?;
        self.add_edge_between(origin, destination, label)
    }

    /// Insert an edge between two stored nodes.
    ///
    /// Returns `None` if either node does not exist.
    pub fn add_edge_between(
        &mut self,
        origin: NodeId,
        destination: NodeId,
        label: Option<L>,
    ) -> Option<EdgeId> {
        let (a, b) = (node_index(origin), node_index(destination));
        if !self.graph.contains_node(a) || !self.graph.contains_node(b) {
            return None;
        }
        if let Some(existing) = self.find_edge(a, b, label.as_ref()) {
            return Some(edge_id(existing));
        }

        let index = self.graph.add_edge(a, b, label);
        self.edge_order.push(index);
        debug!(origin = origin.0, destination = destination.0; "Added edge");
        Some(edge_id(index))
    }

    /// Exact lookup by `(origin, destination, label)`.
    pub fn get_edge(&self, origin: &str, destination: &str, label: Option<&L>) -> Option<Edge<'_, L>> {
        let a = *self.key_to_index.get(origin)?;
        let b = *self.key_to_index.get(destination)?;
        let index = self.find_edge(a, b, label)?;
        self.edge(edge_id(index))
    }

    /// Every edge from `origin` to `destination`, whatever its label.
    pub fn get_edges(&self, origin: &str, destination: &str) -> Vec<Edge<'_, L>> {
        let (Some(&a), Some(&b)) = (self.key_to_index.get(origin), self.key_to_index.get(destination))
        else {
            return Vec::new();
        };
        self.edges()
            .filter(|e| e.origin == node_id(a) && e.destination == node_id(b))
            .collect()
    }

    /// Remove the first edge matching `(origin, destination, label)`.
    ///
    /// Endpoints are left in place. Returns false if nothing matched.
    pub fn rem_edge(&mut self, origin: &str, destination: &str, label: Option<&L>) -> bool {
        let (Some(&a), Some(&b)) = (self.key_to_index.get(origin), self.key_to_index.get(destination))
        else {
            return false;
        };
        match self.find_edge(a, b, label) {
            Some(index) => {
                self.graph.remove_edge(index);
                self.edge_order.remove(index);
                debug!(origin = origin, destination = destination; "Removed edge");
                true
            }
            None => false,
        }
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge<'_, L>> {
        let index = EdgeIndex::new(id.0 as usize);
        let (a, b) = self.graph.edge_endpoints(index)?;
        let content = self.graph.edge_weight(index)?;
        Some(Edge {
            id,
            origin: node_id(a),
            destination: node_id(b),
            content: content.as_ref(),
        })
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_, L>> {
        self.edge_order.iter().filter_map(|index| self.edge(edge_id(index)))
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct successors of the node stored under `key`, one entry per edge.
    pub fn successors(&self, key: &str) -> Vec<&N> {
        let Some(&index) = self.key_to_index.get(key) else {
            return Vec::new();
        };
        self.edges()
            .filter(|e| e.origin == node_id(index))
            .filter_map(|e| self.node(e.destination))
            .collect()
    }

    /// Clear all nodes and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.key_to_index.clear();
        self.node_order.clear();
        self.edge_order.clear();
    }

    /// The earliest inserted edge matching `(a, b, label)`.
    fn find_edge(&self, a: NodeIndex, b: NodeIndex, label: Option<&L>) -> Option<EdgeIndex> {
        self.edge_order.iter().find(|&index| {
            self.graph.edge_endpoints(index) == Some((a, b))
                && self.graph.edge_weight(index).map(Option::as_ref) == Some(label)
        })
    }
}

impl<N, L> Default for Graph<N, L>
where
    N: Identity,
    L: PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostic dump: every node followed by its direct successors.
impl<N, L> fmt::Display for Graph<N, L>
where
    N: Identity,
    L: PartialEq,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directed graph.")?;
        for (_, node) in self.nodes() {
            let key = node.identity();
            write!(f, "\n{key} --> ")?;
            for successor in self.successors(&key) {
                write!(f, "{}, ", successor.identity())?;
            }
        }
        Ok(())
    }
}
