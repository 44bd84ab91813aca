//! Classical 4th-order Runge-Kutta for a body's coupled position/velocity ODE.
//!
//! The system is `dp/dt = v`, `dv/dt = a(p, v, t)`. The acceleration closure
//! sees only the stage-local trial state of the body being integrated; whatever
//! else it reads (other bodies) stays fixed for the whole step.

use crate::geometry::Vector3;

/// Position and velocity of a body after one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Advance `(position, velocity)` by `dt`.
///
/// `acceleration(p, v, dt)` is evaluated four times with the trial state of
/// each RK4 stage.
pub fn rk4_step_3d<F>(position: Vector3, velocity: Vector3, mut acceleration: F, dt: f64) -> State
where
    F: FnMut(Vector3, Vector3, f64) -> Vector3,
{
    let half = dt / 2.0;

    let p1 = position;
    let v1 = velocity;
    let a1 = acceleration(p1, v1, 0.0);

    let p2 = position + v1 * half;
    let v2 = velocity + a1 * half;
    let a2 = acceleration(p2, v2, half);

    let p3 = position + v2 * half;
    let v3 = velocity + a2 * half;
    let a3 = acceleration(p3, v3, half);

    let p4 = position + v3 * dt;
    let v4 = velocity + a3 * dt;
    let a4 = acceleration(p4, v4, dt);

    let sixth = dt / 6.0;
    State {
        position: position + (v1 + v2 * 2.0 + v3 * 2.0 + v4) * sixth,
        velocity: velocity + (a1 + a2 * 2.0 + a3 * 2.0 + a4) * sixth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_free_motion() {
        let state = rk4_step_3d(
            Vector3::ZERO,
            Vector3::new(1.0, 2.0, 0.0),
            |_, _, _| Vector3::ZERO,
            10.0,
        );
        assert_approx_eq!(f64, state.position.x, 10.0, epsilon = 1e-12);
        assert_approx_eq!(f64, state.position.y, 20.0, epsilon = 1e-12);
        assert_eq!(state.velocity, Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_constant_acceleration_is_exact() {
        let g = Vector3::new(0.0, -9.81, 0.0);
        let state = rk4_step_3d(Vector3::ZERO, Vector3::ZERO, |_, _, _| g, 2.0);
        // p = a t² / 2
        assert_approx_eq!(f64, state.position.y, -9.81 * 2.0, epsilon = 1e-12);
        assert_approx_eq!(f64, state.velocity.y, -9.81 * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_harmonic_oscillator_tracks_cosine() {
        // x'' = -x, x(0) = 1, v(0) = 0 => x(t) = cos t
        let dt = 0.01;
        let mut p = Vector3::new(1.0, 0.0, 0.0);
        let mut v = Vector3::ZERO;
        for _ in 0..628 {
            let next = rk4_step_3d(p, v, |p, _, _| -p, dt);
            p = next.position;
            v = next.velocity;
        }
        assert_approx_eq!(f64, p.x, (6.28_f64).cos(), epsilon = 1e-8);
    }

    #[test]
    fn test_stage_evaluations() {
        let mut calls = Vec::new();
        rk4_step_3d(
            Vector3::ZERO,
            Vector3::ZERO,
            |_, _, t| {
                calls.push(t);
                Vector3::ZERO
            },
            4.0,
        );
        assert_eq!(calls, vec![0.0, 2.0, 2.0, 4.0]);
    }
}
