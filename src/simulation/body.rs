//! Physical node state.

use crate::geometry::Vector3;
use crate::graph::Identity;

/// Default mass in kilograms.
pub const DEFAULT_MASS: f64 = 1.0;
/// Default charge in Coulombs.
pub const DEFAULT_CHARGE: f64 = 2e-6;
/// Default radius, only used for hit-testing.
pub const DEFAULT_RADIUS: f64 = 8.0;

/// A spherical point mass wrapping caller content.
///
/// Its identity is the identity of its content, so a `ForceNode` stored in a
/// [`crate::graph::Graph`] is found by the same key the caller used.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceNode<C> {
    pub content: C,
    pub position: Vector3,
    pub velocity: Vector3,
    pub mass: f64,
    pub charge: f64,
    pub radius: f64,
    /// Disabled nodes are skipped by the integrator, e.g. while dragged.
    pub enabled: bool,
}

impl<C> ForceNode<C> {
    /// A node at rest at `position` with default physical properties.
    pub fn new(content: C, position: Vector3) -> Self {
        Self {
            content,
            position,
            velocity: Vector3::ZERO,
            mass: DEFAULT_MASS,
            charge: DEFAULT_CHARGE,
            radius: DEFAULT_RADIUS,
            enabled: true,
        }
    }

    /// Kinetic energy `m v² / 2`.
    pub fn kinetic_energy(&self) -> f64 {
        let speed = self.velocity.norm();
        0.5 * self.mass * speed * speed
    }
}

impl<C: Identity> Identity for ForceNode<C> {
    fn identity(&self) -> String {
        self.content.identity()
    }
}
