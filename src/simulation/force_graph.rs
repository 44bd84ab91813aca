//! ForceGraph - spring/charge simulation over a keyed graph.
//!
//! Each tick integrates every enabled node with RK4 against a snapshot of all
//! node positions taken at the start of the tick. Within one node's four RK4
//! stages only that node moves; every other node stays where it was when the
//! tick began, so the order in which nodes are visited does not matter.

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::body::ForceNode;
use super::config::SimulationConfig;
use super::notifier::{Notifier, ObserverFailure, ObserverResult, SubscriptionId};
use crate::error::Result;
use crate::geometry::Vector3;
use crate::graph::{Edge, EdgeId, Graph, Identity, NodeId};
use crate::physics::{coulomb, hooke, rk4_step_3d};
use crate::spatial::SpatialIndex;

/// Outcome of one simulation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Nodes integrated this tick.
    pub moved: usize,
    /// Force contributions skipped because two bodies coincided, counted per
    /// RK4 stage evaluation.
    pub degenerate: usize,
    /// Observers that returned an error or panicked while being notified.
    pub observer_failures: Vec<ObserverFailure>,
}

/// What the force computation needs to know about every node.
#[derive(Debug, Clone, Copy)]
struct Body {
    id: NodeId,
    position: Vector3,
    charge: f64,
}

/// Read-only view of the graph as of the start of a tick.
struct Snapshot {
    bodies: Vec<Body>,
    positions: HashMap<NodeId, Vector3>,
    /// Endpoints of every non-loop edge.
    springs: Vec<(NodeId, NodeId)>,
}

impl Snapshot {
    /// Net force on `node` (charge `charge`) if it were at `p`.
    ///
    /// Returns the force and the number of contributions skipped because `p`
    /// coincided with the other body.
    fn net_force(&self, config: &SimulationConfig, node: NodeId, charge: f64, p: Vector3) -> (Vector3, usize) {
        let mut force = Vector3::ZERO;
        let mut skipped = 0;

        let neighbours = self.springs.iter().filter_map(|&(origin, destination)| {
            if origin == node {
                Some(destination)
            } else if destination == node {
                Some(origin)
            } else {
                None
            }
        });
        for other in neighbours {
            let Some(&q) = self.positions.get(&other) else {
                continue;
            };
            let separation = p - q;
            let distance = separation.norm();
            let Ok(unit) = separation.unit() else {
                skipped += 1;
                continue;
            };
            let stretch = (distance - config.spring_rest) / 2.0;
            force = force + unit * hooke(config.spring_constant, stretch);
        }

        for other in self.bodies.iter().filter(|b| b.id != node) {
            let separation = p - other.position;
            let distance = separation.norm();
            let (Ok(unit), Ok(magnitude)) = (
                separation.unit(),
                coulomb(charge, other.charge, distance),
            ) else {
                skipped += 1;
                continue;
            };
            force = force + unit * magnitude;
        }

        (force, skipped)
    }
}

/// A directed graph whose nodes are laid out by a physical simulation.
///
/// Edges are springs, every pair of nodes repels like electric charges, and
/// velocity is damped linearly. Observers registered with
/// [`ForceGraph::subscribe`] are notified once after every [`ForceGraph::tick`].
pub struct ForceGraph<C, L = String> {
    graph: Graph<ForceNode<C>, L>,
    config: SimulationConfig,
    notifier: Notifier<ForceGraph<C, L>>,
    spatial: SpatialIndex,
    rng: StdRng,
    ticks: u64,
}

impl<C, L> ForceGraph<C, L>
where
    C: Identity,
    L: PartialEq,
{
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(SimulationConfig::default(), StdRng::from_rng(&mut rand::rng()))
    }

    /// Create an empty graph with `config`.
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, StdRng::from_rng(&mut rand::rng())))
    }

    /// Create an empty graph whose birth positions are reproducible.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, StdRng::seed_from_u64(seed)))
    }

    fn from_parts(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            graph: Graph::new(),
            config,
            notifier: Notifier::new(),
            spatial: SpatialIndex::new(),
            rng,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The underlying topology.
    pub fn graph(&self) -> &Graph<ForceNode<C>, L> {
        &self.graph
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Wrap `content` in a node at a fresh birth position.
    ///
    /// If a node with the same identity exists it is returned untouched.
    /// Content with an empty identity is ignored.
    pub fn add_node(&mut self, content: C) -> Option<NodeId> {
        let key = content.identity();
        if let Some(id) = self.graph.node_id(&key) {
            return Some(id);
        }
        if key.is_empty() {
            debug!("Ignoring node with empty identity");
            return None;
        }

        let position = self.new_position();
        let id = self.graph.add_node(ForceNode::new(content, position))?;
        self.rebuild_spatial_index();
        Some(id)
    }

    /// Ensure both endpoints exist, then insert the edge.
    pub fn add_edge(&mut self, origin: C, destination: C, label: Option<L>) -> Option<EdgeId> {
        let origin = self.add_node(origin)?;
        let destination = self.add_node(destination)?;
        self.graph.add_edge_between(origin, destination, label)
    }

    /// Remove a node and every edge touching it.
    pub fn rem_node(&mut self, key: &str) -> Option<ForceNode<C>> {
        let removed = self.graph.rem_node(key)?;
        self.rebuild_spatial_index();
        Some(removed)
    }

    /// Remove the first edge matching `(origin, destination, label)`.
    pub fn rem_edge(&mut self, origin: &str, destination: &str, label: Option<&L>) -> bool {
        self.graph.rem_edge(origin, destination, label)
    }

    /// Include or exclude a node from integration.
    ///
    /// Returns false if no node is stored under `key`.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        match self.graph.get_node_mut(key) {
            Some(node) => {
                node.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Move a node, e.g. while it is being dragged. Velocity is kept.
    pub fn set_position(&mut self, key: &str, position: Vector3) -> bool {
        let Some(node) = self.graph.get_node_mut(key) else {
            return false;
        };
        node.position = position;
        self.rebuild_spatial_index();
        true
    }

    /// Remove every node and edge. Subscriptions are kept.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.spatial.clear();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_node(&self, key: &str) -> Option<&ForceNode<C>> {
        self.graph.get_node(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ForceNode<C>)> {
        self.graph.nodes()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge<'_, L>> {
        self.graph.edges()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Total kinetic energy of the system.
    pub fn kinetic_energy(&self) -> f64 {
        self.graph.nodes().map(|(_, n)| n.kinetic_energy()).sum()
    }

    /// The first node (in iteration order) whose centre is closer to
    /// `position` than its radius plus the hit tolerance.
    pub fn get_node_at(&self, position: Vector3) -> Option<&ForceNode<C>> {
        let tolerance = self.config.hit_tolerance;
        let reach = self
            .graph
            .nodes()
            .map(|(_, n)| n.radius)
            .fold(0.0_f64, f64::max)
            + tolerance;

        let mut candidates = self.spatial.in_radius(position, reach);
        candidates.sort_unstable_by_key(|&id| self.graph.node_rank(id));
        candidates.into_iter().find_map(|id| {
            self.graph
                .node(id)
                .filter(|n| n.position.distance(position) < n.radius + tolerance)
        })
    }

    /// The node closest to `position`, however far away.
    pub fn nearest_node(&self, position: Vector3) -> Option<&ForceNode<C>> {
        self.spatial.nearest(position).and_then(|id| self.graph.node(id))
    }

    /// Pick a birth position for a new node.
    ///
    /// The node is placed at a uniformly random angle on the circle around
    /// the centroid of the existing nodes whose radius is the largest
    /// centroid distance, never less than the configured birth radius.
    pub fn new_position(&mut self) -> Vector3 {
        let centroid = Vector3::centroid(self.graph.nodes().map(|(_, n)| n.position)).unwrap_or(Vector3::ZERO);
        let radius = self
            .graph
            .nodes()
            .map(|(_, n)| centroid.distance(n.position))
            .fold(self.config.birth_radius, f64::max);

        let angle = self.rng.random_range(0.0..TAU);
        centroid + Vector3::planar(radius * angle.cos(), radius * angle.sin())
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register an observer called after every tick.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ForceGraph<C, L>) -> ObserverResult + Send + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Notify every observer with the current state.
    pub fn publish(&mut self) -> Vec<ObserverFailure> {
        // Observers borrow the whole graph, so the registry is moved out for
        // the duration of the delivery.
        let mut notifier = std::mem::take(&mut self.notifier);
        let failures = notifier.publish(self);
        self.notifier = notifier;
        failures
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance every enabled node by `dt`, then notify observers once.
    ///
    /// Damping is evaluated with each RK4 stage's own velocity rather than
    /// the velocity the node had at the start of the step.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let snapshot = self.snapshot_bodies();
        let config = &self.config;
        let mut report = TickReport::default();
        let mut updates = Vec::new();

        for (id, node) in self.graph.nodes().filter(|(_, n)| n.enabled) {
            let (charge, mass, damping) = (node.charge, node.mass, config.damping);
            let mut skipped = 0;
            let state = rk4_step_3d(
                node.position,
                node.velocity,
                |p, v, _| {
                    let (force, degenerate) = snapshot.net_force(config, id, charge, p);
                    skipped += degenerate;
                    // massless bodies feel no force
                    force.division(mass).unwrap_or(Vector3::ZERO) - v * damping
                },
                dt,
            );
            report.degenerate += skipped;
            updates.push((id, state));
        }

        report.moved = updates.len();
        for (id, state) in updates {
            if let Some(node) = self.graph.node_mut(id) {
                node.position = state.position;
                node.velocity = state.velocity;
            }
        }
        if report.degenerate > 0 {
            warn!(tick = self.ticks, skipped = report.degenerate; "Skipped forces between coincident nodes");
        }

        self.rebuild_spatial_index();
        self.ticks += 1;
        trace!(tick = self.ticks, moved = report.moved; "Tick complete");

        report.observer_failures = self.publish();
        report
    }

    fn snapshot_bodies(&self) -> Snapshot {
        let bodies: Vec<Body> = self
            .graph
            .nodes()
            .map(|(id, n)| Body {
                id,
                position: n.position,
                charge: n.charge,
            })
            .collect();
        let positions = bodies.iter().map(|b| (b.id, b.position)).collect();
        let springs = self
            .graph
            .edges()
            .filter(|e| !e.is_loop())
            .map(|e| (e.origin, e.destination))
            .collect();
        Snapshot {
            bodies,
            positions,
            springs,
        }
    }

    fn rebuild_spatial_index(&mut self) {
        let points: Vec<_> = self.graph.nodes().map(|(id, n)| (id, n.position)).collect();
        self.spatial.rebuild(points);
    }
}

impl<C, L> Default for ForceGraph<C, L>
where
    C: Identity,
    L: PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}
