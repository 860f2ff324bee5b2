//! Fan-out of one producer to many subscribers, and fan-in of several buses

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{StreamError, StreamResult};
use crate::stream::EventStream;

/// Broadcasts every published value to all live subscribers
///
/// Subscribers whose stream was dropped are pruned on the next publish.
/// Closing the bus ends every subscriber's stream.
pub struct EventBus<T> {
    name: &'static str,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<T>>>,
    closed: AtomicBool,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// New subscriber stream; fails once the bus is closed
    pub fn subscribe(&self) -> StreamResult<EventStream<T>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.attach(tx)?;
        Ok(EventStream::new(rx))
    }

    /// One stream fed by every bus in `buses`
    ///
    /// The stream ends once all of them are closed.
    pub fn merge(buses: &[&EventBus<T>]) -> StreamResult<EventStream<T>> {
        if buses.iter().any(|bus| bus.is_closed()) {
            return Err(StreamError::Disposed);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        for bus in buses {
            bus.attach(tx.clone())?;
        }
        Ok(EventStream::new(rx))
    }

    fn attach(&self, tx: mpsc::UnboundedSender<T>) -> StreamResult<()> {
        let mut subscribers = self.subscribers.lock();
        if self.is_closed() {
            return Err(StreamError::Disposed);
        }
        subscribers.push(tx);
        tracing::debug!("{} bus: {} subscribers", self.name, subscribers.len());
        Ok(())
    }

    /// Deliver `item` to every subscriber; returns how many received it
    pub fn publish(&self, item: T) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(item.clone()).is_ok());
        subscribers.len()
    }

    /// Drop all subscribers and refuse new ones
    pub fn close(&self) {
        let mut subscribers = self.subscribers.lock();
        self.closed.store(true, Ordering::SeqCst);
        subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
