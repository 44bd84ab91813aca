//! Scalar force laws.
//!
//! Both laws return a signed magnitude. The caller projects it onto the unit
//! vector pointing from the other body towards the body being integrated, so a
//! positive value pushes the bodies apart and a negative one pulls them in.

use crate::error::{Error, Result};

/// Coulomb's constant in N·m²/C².
pub const COULOMB_CONSTANT: f64 = 8.987_551_792_3e9;

/// Hooke's law: `-k * displacement`.
#[inline]
pub fn hooke(spring_constant: f64, displacement: f64) -> f64 {
    -spring_constant * displacement
}

/// Coulomb's law: `K * q1 * q2 / distance²`.
///
/// Fails with [`Error::DivideByZero`] for coincident charges.
#[inline]
pub fn coulomb(q1: f64, q2: f64, distance: f64) -> Result<f64> {
    if distance == 0.0 {
        return Err(Error::DivideByZero);
    }
    Ok(COULOMB_CONSTANT * q1 * q2 / (distance * distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_hooke_restores() {
        assert_approx_eq!(f64, hooke(0.5, 2.0), -1.0);
        assert_approx_eq!(f64, hooke(0.5, -2.0), 1.0);
        assert_approx_eq!(f64, hooke(0.5, 0.0), 0.0);
    }

    #[test]
    fn test_coulomb_inverse_square() {
        let near = coulomb(2e-6, 2e-6, 10.0).unwrap();
        let far = coulomb(2e-6, 2e-6, 20.0).unwrap();
        assert!(near > 0.0);
        assert_approx_eq!(f64, near / far, 4.0, epsilon = 1e-12);
        assert_approx_eq!(f64, near, COULOMB_CONSTANT * 4e-12 / 100.0);
    }

    #[test]
    fn test_coulomb_opposite_charges_attract() {
        assert!(coulomb(2e-6, -2e-6, 5.0).unwrap() < 0.0);
    }

    #[test]
    fn test_coulomb_zero_distance() {
        assert!(matches!(coulomb(1.0, 1.0, 0.0), Err(Error::DivideByZero)));
    }
}
