use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use engine_logging::engine_debug;
use tokio::sync::watch;

/// Process-wide "a pipeline is executing" flag.
///
/// Cloning shares the flag. Observers subscribe to a watch channel; they see
/// the latest value, so a very short run may be coalesced away.
#[derive(Debug, Clone)]
pub struct RunState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    flag: AtomicBool,
    tx: watch::Sender<bool>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                flag: AtomicBool::new(false),
                tx,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }

    /// Publishes `running` to the flag and all observers.
    pub fn set(&self, running: bool) {
        self.inner.flag.store(running, Ordering::SeqCst);
        self.inner.tx.send_replace(running);
    }

    /// Runs `body` with the flag raised; the flag drops on every exit path,
    /// including a panic or the future being cancelled.
    pub async fn run_exclusive<F>(&self, operation: &str, body: F) -> F::Output
    where
        F: Future,
    {
        let _guard = RunStateGuard::acquire(self, operation);
        body.await
    }
}

/// Holds the flag raised until dropped.
#[derive(Debug)]
pub struct RunStateGuard {
    state: RunState,
    operation: String,
}

impl RunStateGuard {
    pub fn acquire(state: &RunState, operation: &str) -> Self {
        engine_debug!("RunState raised for {}", operation);
        state.set(true);
        Self {
            state: state.clone(),
            operation: operation.to_string(),
        }
    }
}

impl Drop for RunStateGuard {
    fn drop(&mut self) {
        self.state.set(false);
        engine_debug!("RunState released after {}", self.operation);
    }
}
