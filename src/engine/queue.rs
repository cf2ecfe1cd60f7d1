// src/engine/queue.rs
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::engine::creds::CredentialPair;

/// Shared FIFO of pending attempts.
///
/// Unbounded; the supervisor fills it from the credential source, calls
/// [`AttemptQueue::close`], and the workers drain it. `pop` waits at most
/// the given duration so a worker blocked on an empty queue notices the
/// stop signal promptly. `drain` discards everything still queued and
/// releases blocked poppers, used on early termination.
#[derive(Debug, Default)]
pub struct AttemptQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct Inner {
    items: VecDeque<CredentialPair>,
    closed: bool,
}

impl AttemptQueue {
    pub fn new() -> Self {
        AttemptQueue::default()
    }

    pub fn push(&self, pair: CredentialPair) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.items.push_back(pair);
        }
        self.notify.notify_one();
    }

    /// No more items will arrive; empty now means exhausted.
    pub fn close(&self) {
        self.inner.lock().unwrap().closed = true;
        self.notify.notify_waiters();
    }

    /// Discard all queued items and close, so blocked `pop` calls return
    /// quickly instead of waiting out their timeout.
    pub fn drain(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.items.clear();
            inner.closed = true;
        }
        self.notify.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dequeue the next pair, waiting up to `wait` for one to appear.
    /// Returns `None` when the queue is empty and closed, or when the wait
    /// elapses with nothing pending.
    pub async fn pop(&self, wait: Duration) -> Option<CredentialPair> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(pair) = inner.items.pop_front() {
                    return Some(pair);
                }
                if inner.closed {
                    return None;
                }
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return None;
            }
        }
    }
}
