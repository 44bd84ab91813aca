//! Stateless force laws and the numerical integrator.

mod forces;
mod rk4;

pub use forces::{COULOMB_CONSTANT, coulomb, hooke};
pub use rk4::{State, rk4_step_3d};
