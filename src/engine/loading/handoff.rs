use crossbeam_channel::{Receiver, Sender, select, unbounded};
use std::sync::{Mutex, PoisonError};

/// Multi-producer queue of keys waiting for the loader thread.
///
/// Waiting on the queue can be interrupted with [`close`](HandoffQueue::close),
/// so an idle loader never keeps a shutdown from completing.
#[derive(Debug)]
pub struct HandoffQueue {
    tx: Sender<String>,
    rx: Receiver<String>,
    close_tx: Mutex<Option<Sender<()>>>,
    close_rx: Receiver<()>,
}

impl HandoffQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let (close_tx, close_rx) = unbounded();

        Self {
            tx,
            rx,
            close_tx: Mutex::new(Some(close_tx)),
            close_rx,
        }
    }

    /// Returns `false` if the queue was closed and the key was dropped.
    pub fn push(&self, key: String) -> bool {
        if self.is_closed() {
            return false;
        }
        self.tx.send(key).is_ok()
    }

    pub fn try_pop(&self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Blocks until a key arrives. Returns `None` once the queue is closed.
    pub fn wait_pop(&self) -> Option<String> {
        if self.is_closed() {
            return None;
        }

        select! {
            recv(self.rx) -> key => key.ok(),
            recv(self.close_rx) -> _ => None,
        }
    }

    /// Wakes every waiter. Queued keys are discarded.
    pub fn close(&self) {
        let sender = self
            .close_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_closed(&self) -> bool {
        self.close_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for HandoffQueue {
    fn default() -> Self {
        Self::new()
    }
}
