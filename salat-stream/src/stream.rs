//! Receiving end of a subscription

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::handle::SubscriptionHandle;

/// Events delivered to one subscriber
///
/// Usable with `recv().await`, `try_recv()`, or as a `futures::Stream`.
/// When the stream owns the chain that feeds it (standalone scheduler
/// subscriptions), dropping or closing the stream cancels that chain.
#[derive(Debug)]
pub struct EventStream<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    handle: Option<SubscriptionHandle>,
}

impl<T> EventStream<T> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<T>) -> Self {
        Self {
            receiver,
            handle: None,
        }
    }

    pub(crate) fn with_handle(receiver: mpsc::UnboundedReceiver<T>, handle: SubscriptionHandle) -> Self {
        Self {
            receiver,
            handle: Some(handle),
        }
    }

    /// Wait for the next event; `None` once the producer is gone
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Next already-delivered event, without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// All already-delivered events
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stop receiving and cancel the owned chain, if any
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        self.receiver.close();
    }

    /// The chain handle, for standalone subscriptions
    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        self.handle.as_ref()
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
