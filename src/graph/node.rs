//! Node identity.
//!
//! Nodes are stored under a stable string key produced by [`Identity`]. Two
//! values with the same key are the same node as far as the graph is
//! concerned, so implementations must never let distinct contents collide
//! unless the aliasing is intended.

use std::fmt;

/// Stable node identifier.
///
/// This ID remains valid even after other nodes are removed from the graph.
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Anything that can be stored as a graph node.
///
/// An empty identity stands for "no node": the graph ignores it.
pub trait Identity {
    /// The key this value is stored under.
    fn identity(&self) -> String;
}

impl Identity for String {
    fn identity(&self) -> String {
        self.clone()
    }
}

impl Identity for &str {
    fn identity(&self) -> String {
        (*self).to_owned()
    }
}

impl Identity for char {
    fn identity(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_identity_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn identity(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_identity_display!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(format!("{}", NodeId(42)), "Node(42)");
    }

    #[test]
    fn test_identity_keys() {
        assert_eq!("alpha".identity(), "alpha");
        assert_eq!(String::from("beta").identity(), "beta");
        assert_eq!('c'.identity(), "c");
        assert_eq!(42u32.identity(), "42");
        assert_eq!((-7i64).identity(), "-7");
    }
}
