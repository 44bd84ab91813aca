//! Publish/subscribe registry of observer callbacks.
//!
//! A failing observer never prevents delivery to the ones registered after
//! it: both `Err` returns and panics are caught and reported back to the
//! publisher as [`ObserverFailure`]s. Panics are only catchable when the
//! build unwinds; the release profile aborts.
//!
//! Callbacks receive a shared reference to the publisher, so they cannot
//! mutate it or publish again from inside a delivery.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::warn;

/// Error type observers may return.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Result type observers return.
pub type ObserverResult = Result<(), ObserverError>;

type Callback<T> = Box<dyn FnMut(&T) -> ObserverResult + Send>;

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

/// An observer that failed during one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub subscription: SubscriptionId,
    pub message: String,
}

/// Ordered list of observers of `T`.
pub struct Notifier<T> {
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
    next_id: u32,
}

impl<T> Notifier<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Register `callback` for every future publish.
    ///
    /// The same closure logic may be registered several times; each
    /// registration gets its own ID and is invoked separately.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) -> ObserverResult + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a registration. Returns false if it was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscribers.iter().position(|(sid, _)| *sid == id) {
            Some(position) => {
                self.subscribers.remove(position);
                true
            }
            None => false,
        }
    }

    /// Invoke every observer with `source`, in subscription order.
    pub fn publish(&mut self, source: &T) -> Vec<ObserverFailure> {
        let mut failures = Vec::new();
        for (id, callback) in &mut self.subscribers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(source)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            warn!(subscription = id.0, error = message.as_str(); "Observer failed");
            failures.push(ObserverFailure {
                subscription: *id,
                message,
            });
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
