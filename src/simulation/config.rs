//! Simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the spring/charge simulation.
///
/// Every field has a default, so hosts may supply any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Distance at which a spring exerts no force (default: 25.0).
    pub spring_rest: f64,
    /// Hooke constant of every edge (default: 0.0001).
    pub spring_constant: f64,
    /// Linear drag coefficient applied to velocity (default: 0.005).
    pub damping: f64,
    /// Tick period in milliseconds, also the integration step (default: 25).
    pub period_ms: u32,
    /// Minimum radius of the birth circle around the centroid (default: 50.0).
    pub birth_radius: f64,
    /// Slack added to a node's radius when hit-testing (default: 5.0).
    pub hit_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spring_rest: 25.0,
            spring_constant: 0.0001,
            damping: 0.005,
            period_ms: 25,
            birth_radius: 50.0,
            hit_tolerance: 5.0,
        }
    }
}

impl SimulationConfig {
    /// Reject parameters the integrator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            return Err(Error::InvalidConfig("periodMs must be positive".into()));
        }
        let non_negative = [
            ("springRest", self.spring_rest),
            ("springConstant", self.spring_constant),
            ("damping", self.damping),
            ("birthRadius", self.birth_radius),
            ("hitTolerance", self.hit_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// The integration step matching the tick period.
    pub fn dt(&self) -> f64 {
        f64::from(self.period_ms)
    }
}
