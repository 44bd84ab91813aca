//! Immutable 3D vector value type.
//!
//! Every operation returns a new value. Scalar division is the only fallible
//! operation and is deliberately not exposed as an operator, so callers go
//! through [`Vector3::division`] and handle [`Error::DivideByZero`].

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point or displacement in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A vector in the z = 0 plane.
    #[inline]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Scale by `k`.
    #[inline]
    pub fn product(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    /// Divide every component by `k`.
    ///
    /// Fails with [`Error::DivideByZero`] when `k` is exactly zero.
    #[inline]
    pub fn division(self, k: f64) -> Result<Self> {
        if k == 0.0 {
            return Err(Error::DivideByZero);
        }
        Ok(Self::new(self.x / k, self.y / k, self.z / k))
    }

    /// Euclidean length.
    #[inline]
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.minus(other).norm()
    }

    /// The vector scaled to length 1.
    pub fn unit(self) -> Result<Self> {
        self.division(self.norm())
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise mean of a set of points, `None` when the set is empty.
    pub fn centroid<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let (sum, count) = points
            .into_iter()
            .fold((Self::ZERO, 0usize), |(sum, count), p| (sum.add(p), count + 1));
        sum.division(count as f64).ok()
    }
}

impl Add for Vector3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vector3::add(self, rhs)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.minus(rhs)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        self.product(rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.product(-1.0)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_arithmetic_is_pure() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);

        assert_eq!(a.add(b), Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b.minus(a), Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(a.product(2.0), Vector3::new(2.0, 4.0, 6.0));
        // operands untouched
        assert_eq!(a, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b, Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_operators_match_methods() {
        let a = Vector3::new(1.0, -2.0, 0.5);
        let b = Vector3::new(-3.0, 4.0, 2.0);
        assert_eq!(a + b, a.add(b));
        assert_eq!(a - b, a.minus(b));
        assert_eq!(a * 3.0, a.product(3.0));
        assert_eq!(-a, a.product(-1.0));
    }

    #[test]
    fn test_norm() {
        assert_approx_eq!(f64, Vector3::new(3.0, 4.0, 0.0).norm(), 5.0);
        assert_approx_eq!(f64, Vector3::new(1.0, 2.0, 2.0).norm(), 3.0);
        assert_approx_eq!(f64, Vector3::ZERO.norm(), 0.0);
    }

    #[test]
    fn test_division() {
        let v = Vector3::new(2.0, 4.0, 6.0);
        assert_eq!(v.division(2.0).unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert!(matches!(v.division(0.0), Err(Error::DivideByZero)));
    }

    #[test]
    fn test_unit() {
        let u = Vector3::new(0.0, 10.0, 0.0).unit().unwrap();
        assert_eq!(u, Vector3::new(0.0, 1.0, 0.0));
        assert!(Vector3::ZERO.unit().is_err());
    }

    #[test]
    fn test_centroid() {
        let points = [Vector3::planar(0.0, 0.0), Vector3::planar(4.0, 0.0), Vector3::planar(2.0, 6.0)];
        assert_eq!(Vector3::centroid(points), Some(Vector3::planar(2.0, 2.0)));
        assert_eq!(Vector3::centroid(std::iter::empty()), None);
    }
}
