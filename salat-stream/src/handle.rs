//! Cancellation of timer chains
//!
//! A chain is one spawned task. Cancelling it raises its shutdown flag and
//! aborts the task; the task re-checks the flag after every wake-up, so an
//! emission that races with a cancel is always dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shutdown flag, optionally tied to a parent flag
///
/// Raising the parent stops every child; raising a child leaves the parent
/// and its siblings running. Tasks waiting in [`ShutdownSignal::triggered`]
/// wake as soon as either flag is raised.
#[derive(Clone)]
pub struct ShutdownSignal {
    flag: Arc<watch::Sender<bool>>,
    parent: Option<Arc<watch::Sender<bool>>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self {
            flag: Arc::new(watch::Sender::new(false)),
            parent: None,
        }
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new signal that is also raised when `self` is
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(watch::Sender::new(false)),
            parent: Some(Arc::clone(&self.flag)),
        }
    }

    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        let own = *self.flag.borrow();
        own || self.parent.as_ref().is_some_and(|parent| {
            let raised = *parent.borrow();
            raised
        })
    }

    /// Resolves once this signal or its parent is raised
    pub async fn triggered(&self) {
        let mut own = self.flag.subscribe();
        match &self.parent {
            Some(parent) => {
                let mut parent = parent.subscribe();
                tokio::select! {
                    _ = wait_raised(&mut own) => {}
                    _ = wait_raised(&mut parent) => {}
                }
            }
            None => wait_raised(&mut own).await,
        }
    }
}

async fn wait_raised(rx: &mut watch::Receiver<bool>) {
    loop {
        let raised = *rx.borrow_and_update();
        if raised {
            return;
        }
        if rx.changed().await.is_err() {
            // unreachable while the signal holds the sender
            std::future::pending::<()>().await;
        }
    }
}

impl fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

/// Handle of a running timer chain; dropping it cancels the chain
#[derive(Debug)]
pub struct SubscriptionHandle {
    signal: ShutdownSignal,
    task: JoinHandle<()>,
    started_at: Instant,
}

impl SubscriptionHandle {
    pub(crate) fn new(signal: ShutdownSignal, task: JoinHandle<()>) -> Self {
        Self {
            signal,
            task,
            started_at: Instant::now(),
        }
    }

    /// Stop the chain; no further emission happens after this returns
    pub fn cancel(&self) {
        self.signal.trigger();
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_triggered()
    }

    /// True once the task has returned or been aborted
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
