//! Force Graph - WASM Module
//!
//! This crate computes a continuously updated layout for a directed graph by
//! simulating it physically: edges are springs, every pair of nodes repels
//! like electric charges, and motion is damped toward equilibrium. It is
//! compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen, and can equally be used as a plain Rust library.
//!
//! # Architecture
//!
//! - `geometry`: the immutable `Vector3` value type
//! - `physics`: Hooke's law, Coulomb's law and the RK4 integrator
//! - `graph`: generic directed graph keyed by node identity (petgraph StableGraph)
//! - `spatial`: R-tree spatial indexing for pointer hit testing
//! - `simulation`: `ForceGraph`, observers and the native tick scheduler

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod geometry;
pub mod graph;
pub mod physics;
pub mod simulation;
pub mod spatial;

use error::Error;
use geometry::Vector3;
use simulation::{ForceGraph, ObserverResult, SimulationConfig, SubscriptionId};

type JsGraph = ForceGraph<String, String>;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

/// A JavaScript function registered as an observer.
struct JsObserver(Function);

// SAFETY: wasm32-unknown-unknown runs the module on a single thread, and the
// facade never hands its graph to another thread, so the function is only
// ever called from the thread that created it.
unsafe impl Send for JsObserver {}

impl JsObserver {
    fn notify(&self, graph: &JsGraph) -> ObserverResult {
        let snapshot = serde_wasm_bindgen::to_value(&graph.snapshot()).map_err(|err| err.to_string())?;
        self.0
            .call1(&JsValue::NULL, &snapshot)
            .map_err(|err| format!("observer threw: {err:?}"))?;
        Ok(())
    }
}

/// A `window.setInterval` registration, cleared on drop.
struct IntervalTask {
    id: i32,
    period_ms: u32,
    _callback: Closure<dyn FnMut()>,
}

impl IntervalTask {
    fn spawn(graph: &Rc<RefCell<JsGraph>>, period_ms: u32) -> Result<Self, Error> {
        let timeout = i32::try_from(period_ms)
            .ok()
            .filter(|&ms| ms > 0)
            .ok_or_else(|| Error::InvalidConfig(format!("periodMs out of range: {period_ms}")))?;
        let window = web_sys::window().ok_or_else(|| Error::Js("no global window".into()))?;

        let graph = Rc::clone(graph);
        let dt = f64::from(period_ms);
        let callback = Closure::<dyn FnMut()>::new(move || match graph.try_borrow_mut() {
            Ok(mut graph) => {
                graph.tick(dt);
            }
            Err(_) => log::warn!("Skipping tick: graph is busy"),
        });

        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), timeout)
            .map_err(|err| Error::Js(format!("{err:?}")))?;

        Ok(Self {
            id,
            period_ms,
            _callback: callback,
        })
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.id);
        }
    }
}

/// Main entry point for the force graph.
///
/// Wraps a [`ForceGraph`] keyed by strings and drives it from the browser's
/// timer. Every method takes `&self`, so observers may call back into the
/// facade; calls that need the graph while a tick is in progress fail with
/// a "busy" error instead of re-entering the simulation.
#[wasm_bindgen]
pub struct ForceGraphWasm {
    graph: Rc<RefCell<JsGraph>>,
    interval: RefCell<Option<IntervalTask>>,
}

impl ForceGraphWasm {
    fn from_graph(graph: JsGraph) -> Result<Self, Error> {
        let period_ms = graph.config().period_ms;
        let facade = Self {
            graph: Rc::new(RefCell::new(graph)),
            interval: RefCell::new(None),
        };
        facade.start_timer(period_ms)?;
        Ok(facade)
    }

    fn start_timer(&self, period_ms: u32) -> Result<(), Error> {
        self.stop();
        let task = IntervalTask::spawn(&self.graph, period_ms)?;
        *self.interval.borrow_mut() = Some(task);
        Ok(())
    }

    fn read<R>(&self, f: impl FnOnce(&JsGraph) -> R) -> Result<R, Error> {
        let graph = self.graph.try_borrow().map_err(|_| busy())?;
        Ok(f(&graph))
    }

    fn write<R>(&self, f: impl FnOnce(&mut JsGraph) -> R) -> Result<R, Error> {
        let mut graph = self.graph.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut graph))
    }
}

fn busy() -> Error {
    Error::Js("graph is busy: called from inside a tick".into())
}

#[wasm_bindgen]
impl ForceGraphWasm {
    /// Create an empty graph and start simulating it.
    ///
    /// # Arguments
    ///
    /// * `period_ms` - Tick period, defaults to 25 ms
    #[wasm_bindgen(constructor)]
    pub fn new(period_ms: Option<u32>) -> Result<ForceGraphWasm, JsValue> {
        let config = SimulationConfig {
            period_ms: period_ms.unwrap_or(SimulationConfig::default().period_ms),
            ..Default::default()
        };
        Ok(Self::from_graph(JsGraph::with_config(config)?)?)
    }

    /// Create an empty graph from a (partial) configuration object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<ForceGraphWasm, JsValue> {
        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::from_graph(JsGraph::with_config(config)?)?)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start (or restart) the simulation timer.
    pub fn start(&self, period_ms: Option<u32>) -> Result<(), JsValue> {
        let period_ms = match period_ms {
            Some(ms) => ms,
            None => self.read(|g| g.config().period_ms)?,
        };
        Ok(self.start_timer(period_ms)?)
    }

    /// Stop the simulation timer. Does nothing when already stopped.
    pub fn stop(&self) {
        self.interval.borrow_mut().take();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.interval.borrow().is_some()
    }

    #[wasm_bindgen(js_name = periodMs)]
    pub fn period_ms(&self) -> Option<u32> {
        self.interval.borrow().as_ref().map(|task| task.period_ms)
    }

    /// Advance the simulation by `dt` by hand.
    pub fn tick(&self, dt: f64) -> Result<(), JsValue> {
        Ok(self.write(|g| {
            g.tick(dt);
        })?)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node. Returns false for an empty key.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&self, key: String) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.add_node(key).is_some())?)
    }

    /// Remove a node and its edges. Returns true if it existed.
    #[wasm_bindgen(js_name = remNode)]
    pub fn rem_node(&self, key: &str) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.rem_node(key).is_some())?)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> Result<u32, JsValue> {
        Ok(self.read(|g| g.node_count() as u32)?)
    }

    /// Include or exclude a node from the simulation, e.g. while dragging it.
    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&self, key: &str, enabled: bool) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.set_enabled(key, enabled))?)
    }

    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&self, key: &str, x: f64, y: f64) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.set_position(key, Vector3::planar(x, y)))?)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge, creating missing endpoints. Idempotent per
    /// `(origin, destination, label)`.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&self, origin: String, destination: String, label: Option<String>) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.add_edge(origin, destination, label).is_some())?)
    }

    /// Remove the first edge matching `(origin, destination, label)`.
    #[wasm_bindgen(js_name = remEdge)]
    pub fn rem_edge(&self, origin: &str, destination: &str, label: Option<String>) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.rem_edge(origin, destination, label.as_ref()))?)
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> Result<u32, JsValue> {
        Ok(self.read(|g| g.edge_count() as u32)?)
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Key of the first node under the pointer, if any.
    #[wasm_bindgen(js_name = getNodeAt)]
    pub fn get_node_at(&self, x: f64, y: f64) -> Result<Option<String>, JsValue> {
        Ok(self.read(|g| g.get_node_at(Vector3::planar(x, y)).map(|n| n.content.clone()))?)
    }

    #[wasm_bindgen(js_name = nearestNode)]
    pub fn nearest_node(&self, x: f64, y: f64) -> Result<Option<String>, JsValue> {
        Ok(self.read(|g| g.nearest_node(Vector3::planar(x, y)).map(|n| n.content.clone()))?)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Call `callback(snapshot)` after every tick. Returns the subscription ID.
    pub fn subscribe(&self, callback: Function) -> Result<u32, JsValue> {
        let observer = JsObserver(callback);
        let id = self.write(|g| g.subscribe(move |graph: &JsGraph| observer.notify(graph)))?;
        Ok(id.0)
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&self, id: u32) -> Result<bool, JsValue> {
        Ok(self.write(|g| g.unsubscribe(SubscriptionId(id)))?)
    }

    /// The current nodes and edges as a plain object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.read(|g| g.snapshot())?;
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }

    /// Human-readable adjacency dump.
    #[wasm_bindgen(js_name = toString)]
    pub fn dump(&self) -> Result<String, JsValue> {
        Ok(self.read(|g| g.graph().to_string())?)
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::Graph;
    use float_cmp::assert_approx_eq;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn seeded() -> ForceGraph<&'static str> {
        ForceGraph::with_seed(SimulationConfig::default(), 11).unwrap()
    }

    /// Nodes A, B, C with A→B labelled "x" and B→C unlabelled; removing B
    /// leaves A and C and no edges.
    #[test]
    fn test_remove_middle_node() {
        let mut graph = seeded();
        graph.add_edge("A", "B", Some("x".to_string()));
        graph.add_edge("B", "C", None);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        graph.rem_node("B");
        let keys: Vec<_> = graph.nodes().map(|(_, n)| n.content).collect();
        assert_eq!(keys, vec!["A", "C"]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_generic_graph_and_force_graph_agree() {
        let mut plain: Graph<&str> = Graph::new();
        let mut forced = seeded();
        for (a, b, l) in [("a", "b", None), ("b", "c", Some("l")), ("a", "b", None), ("c", "c", None)] {
            plain.add_edge(a, b, l.map(String::from));
            forced.add_edge(a, b, l.map(String::from));
        }
        assert_eq!(plain.node_count(), forced.node_count());
        assert_eq!(plain.edge_count(), forced.edge_count());
        assert_eq!(plain.to_string(), forced.graph().to_string());
    }

    /// Grow a graph one node at a time; each newcomer lands on the circle
    /// around the centroid of the nodes that were there before it.
    #[test]
    fn test_birth_positions_ring_the_cluster() {
        let mut graph = seeded();
        graph.add_node("n0");
        for i in 1..12 {
            let positions: Vec<_> = graph.nodes().map(|(_, n)| n.position).collect();
            let centroid = Vector3::centroid(positions.iter().copied()).unwrap();
            let spread = positions
                .iter()
                .map(|p| p.distance(centroid))
                .fold(50.0_f64, f64::max);

            let key: &'static str = Box::leak(format!("n{i}").into_boxed_str());
            graph.add_node(key);
            let born = graph.get_node(key).unwrap().position;
            assert_approx_eq!(f64, born.distance(centroid), spread, epsilon = 1e-9);
            graph.tick(25.0);
        }
    }

    /// A small chain settles without diverging and keeps publishing.
    #[test]
    fn test_chain_settles_and_publishes() {
        let mut graph = seeded();
        for (a, b) in [("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")] {
            graph.add_edge(a, b, None);
        }
        let deliveries = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&deliveries);
        graph.subscribe(|_| Err("first observer always fails".into()));
        graph.subscribe(move |_| {
            *sink.lock() += 1;
            Ok(())
        });

        for _ in 0..2000 {
            let report = graph.tick(25.0);
            assert_eq!(report.observer_failures.len(), 1);
        }
        assert_eq!(*deliveries.lock(), 2000);
        assert!(graph.kinetic_energy() < 1e-6);
        for (_, node) in graph.nodes() {
            assert!(node.position.is_finite());
        }
    }

    /// Dragging: a disabled node stays where it was put while the rest of
    /// the graph reacts to it.
    #[test]
    fn test_drag_workflow() {
        let mut graph = seeded();
        graph.add_edge("hub", "leaf", None);
        for _ in 0..10 {
            graph.tick(25.0);
        }

        let grab = graph.get_node("hub").unwrap().position;
        assert_eq!(graph.get_node_at(grab).unwrap().content, "hub");
        graph.set_enabled("hub", false);
        graph.set_position("hub", Vector3::planar(300.0, 300.0));
        let leaf_before = graph.get_node("leaf").unwrap().position;
        for _ in 0..10 {
            graph.tick(25.0);
        }
        assert_eq!(graph.get_node("hub").unwrap().position, Vector3::planar(300.0, 300.0));
        assert_ne!(graph.get_node("leaf").unwrap().position, leaf_before);

        graph.set_enabled("hub", true);
        graph.tick(25.0);
        assert_ne!(graph.get_node("hub").unwrap().position, Vector3::planar(300.0, 300.0));
    }

    #[test]
    fn test_custom_spring_rest() {
        let config = SimulationConfig {
            spring_rest: 60.0,
            ..Default::default()
        };
        let mut graph: ForceGraph<&str> = ForceGraph::with_seed(config, 5).unwrap();
        graph.add_edge("a", "b", None);
        graph.set_position("a", Vector3::planar(-30.0, 0.0));
        graph.set_position("b", Vector3::planar(30.0, 0.0));
        for _ in 0..1500 {
            graph.tick(25.0);
        }
        let d = graph.get_node("a").unwrap().position.distance(graph.get_node("b").unwrap().position);
        assert!((60.0..62.0).contains(&d), "settled at {d}");
    }
}
