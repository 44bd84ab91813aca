//! Error types for the force graph engine.
//!
//! Most failure modes of a running simulation are not errors at all: coincident
//! points are skipped and observer failures are collected into the tick report.
//! [`Error`] covers what a caller can actually act on.

use std::io;

use thiserror::Error;

/// The main error type for force graph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector or scalar was divided by zero.
    #[error("division by zero")]
    DivideByZero,

    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    /// The background tick thread could not be spawned.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] io::Error),

    #[error("javascript error: {0}")]
    Js(String),

    /// The graph was locked from inside one of its own tick deliveries.
    #[error("graph is busy: locked from inside its own tick")]
    Reentrant,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for wasm_bindgen::JsValue {
    fn from(err: Error) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::DivideByZero.to_string(), "division by zero");
        assert_eq!(
            Error::InvalidConfig("period must be positive".into()).to_string(),
            "invalid simulation config: period must be positive"
        );
    }

    #[test]
    fn test_io_error_converts_to_scheduler() {
        let err: Error = io::Error::other("no threads").into();
        assert!(matches!(err, Error::Scheduler(_)));
    }
}
