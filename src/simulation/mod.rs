//! Force-directed simulation.
//!
//! - [`ForceNode`]: physical state wrapped around caller content
//! - [`ForceGraph`]: the graph plus the per-tick force computation
//! - [`Notifier`]: observers notified after every tick
//! - [`Simulation`]: background timer driving a [`SharedGraph`] (native only)

mod body;
mod config;
mod force_graph;
mod notifier;
#[cfg(not(target_arch = "wasm32"))]
mod scheduler;
mod snapshot;

pub use body::{DEFAULT_CHARGE, DEFAULT_MASS, DEFAULT_RADIUS, ForceNode};
pub use config::SimulationConfig;
pub use force_graph::{ForceGraph, TickReport};
pub use notifier::{Notifier, ObserverError, ObserverFailure, ObserverResult, SubscriptionId};
#[cfg(not(target_arch = "wasm32"))]
pub use scheduler::{SharedGraph, Simulation};
pub use snapshot::{EdgeView, GraphSnapshot, NodeView};
