// src/engine/stop.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::engine::queue::AttemptQueue;

/// Shared cancellation signal, logically set once. Setting it does not
/// abort in-flight attempts; the contract is "no new attempts are started".
#[derive(Debug, Default)]
pub struct StopSignal {
    flag: AtomicBool,
}

impl StopSignal {
    pub fn new() -> Self {
        StopSignal::default()
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Set the signal. Returns `true` only for the first caller, so racing
    /// workers can decide who performs the one-time shutdown actions.
    pub fn set(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }
}

/// Handle for external interruption of a run (operator Ctrl-C): sets the
/// stop signal and drains the queue so workers exit promptly.
#[derive(Clone)]
pub struct StopHandle {
    pub(crate) stop: Arc<StopSignal>,
    pub(crate) queue: Arc<AttemptQueue>,
}

impl StopHandle {
    /// Idempotent; repeated triggers are no-ops.
    pub fn trigger(&self) {
        if self.stop.set() {
            info!("stop requested, draining attempt queue");
            self.queue.drain();
        }
    }

    pub fn is_set(&self) -> bool {
        self.stop.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_set_wins() {
        let stop = StopSignal::new();
        assert!(!stop.is_set());
        assert!(stop.set());
        assert!(!stop.set());
        assert!(stop.is_set());
    }

    #[test]
    fn trigger_is_idempotent() {
        let handle = StopHandle {
            stop: Arc::new(StopSignal::new()),
            queue: Arc::new(AttemptQueue::new()),
        };
        handle.queue.push(crate::engine::CredentialPair::new("a", "b"));
        handle.trigger();
        handle.trigger();
        assert!(handle.is_set());
        assert!(handle.queue.is_empty());
    }
}
