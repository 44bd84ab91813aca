//! Geometry primitives shared by the physics and spatial modules.

mod vector;

pub use vector::Vector3;
