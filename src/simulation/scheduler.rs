//! Recurring tick task for native targets.
//!
//! A [`Simulation`] owns the graph behind a mutex and at most one background
//! thread that ticks it every period. Ticks and external mutations take the
//! same lock, so they never interleave. Observers run on the tick thread
//! while the lock is held; a [`SharedGraph::lock`] from inside a delivery
//! fails with [`Error::Reentrant`] instead of deadlocking.

use std::cell::Cell;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};

use super::force_graph::ForceGraph;
use crate::error::{Error, Result};
use crate::graph::Identity;

thread_local! {
    /// Set on the tick thread for the duration of a tick.
    static TICKING: Cell<bool> = const { Cell::new(false) };
}

/// Cloneable handle to the graph driven by a [`Simulation`].
pub struct SharedGraph<C, L = String> {
    inner: Arc<Mutex<ForceGraph<C, L>>>,
}

impl<C, L> SharedGraph<C, L> {
    fn new(graph: ForceGraph<C, L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Lock the graph for queries or mutation between ticks.
    ///
    /// Fails with [`Error::Reentrant`] when called by an observer during a
    /// tick, since the tick already holds the lock.
    pub fn lock(&self) -> Result<MutexGuard<'_, ForceGraph<C, L>>> {
        if TICKING.get() {
            return Err(Error::Reentrant);
        }
        Ok(self.inner.lock())
    }
}

impl<C, L> Clone for SharedGraph<C, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Handle to the running tick thread.
struct TickTask {
    stop: Sender<()>,
    handle: JoinHandle<()>,
    period_ms: u32,
}

impl TickTask {
    fn spawn<C, L>(graph: SharedGraph<C, L>, period_ms: u32) -> Result<Self>
    where
        C: Identity + Send + 'static,
        L: PartialEq + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        let period = Duration::from_millis(u64::from(period_ms));
        let dt = f64::from(period_ms);

        let handle = thread::Builder::new()
            .name("force-graph-tick".into())
            .spawn(move || {
                loop {
                    match stopped.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            let mut graph = graph.inner.lock();
                            TICKING.set(true);
                            graph.tick(dt);
                            TICKING.set(false);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Tick thread exiting");
            })?;

        Ok(Self {
            stop,
            handle,
            period_ms,
        })
    }

    fn cancel(self) {
        // the thread may already be gone if a tick panicked
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            warn!("Tick thread panicked");
        }
    }
}

/// A [`ForceGraph`] advanced by a background timer.
///
/// The simulation is running as soon as it is created; [`Simulation::stop`]
/// cancels the timer and [`Simulation::start`] replaces it. Dropping the
/// simulation stops it.
pub struct Simulation<C, L = String> {
    graph: SharedGraph<C, L>,
    task: Option<TickTask>,
}

impl<C, L> Simulation<C, L>
where
    C: Identity + Send + 'static,
    L: PartialEq + Send + 'static,
{
    /// Take ownership of `graph` and start ticking it at its configured period.
    pub fn new(graph: ForceGraph<C, L>) -> Result<Self> {
        let period_ms = graph.config().period_ms;
        let mut simulation = Self {
            graph: SharedGraph::new(graph),
            task: None,
        };
        simulation.start(period_ms)?;
        Ok(simulation)
    }

    /// Start ticking every `period_ms` milliseconds, replacing any running
    /// timer. Each tick integrates over `period_ms` time units.
    pub fn start(&mut self, period_ms: u32) -> Result<()> {
        if period_ms == 0 {
            return Err(Error::InvalidConfig("periodMs must be positive".into()));
        }
        self.stop();
        self.task = Some(TickTask::spawn(self.graph.clone(), period_ms)?);
        info!(period_ms; "Simulation started");
        Ok(())
    }

    /// Cancel the timer. Does nothing when already stopped.
    ///
    /// A tick in progress is allowed to finish.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            info!("Simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Period of the running timer.
    pub fn period_ms(&self) -> Option<u32> {
        self.task.as_ref().map(|task| task.period_ms)
    }

    /// Lock the graph for queries or mutation between ticks.
    pub fn lock(&self) -> Result<MutexGuard<'_, ForceGraph<C, L>>> {
        self.graph.lock()
    }

    /// Shared handle for collaborators that outlive a borrow, such as an
    /// input handler on another thread.
    pub fn shared(&self) -> SharedGraph<C, L> {
        self.graph.clone()
    }
}

impl<C, L> Drop for Simulation<C, L> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}
