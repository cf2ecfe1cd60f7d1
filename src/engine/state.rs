// src/engine/state.rs
use std::io;
use std::path::Path;
use std::sync::Mutex;

use log::error;

use crate::engine::creds::CredentialPair;
use crate::output::sink::ResultSink;
use crate::probe::AttemptOutcome;

/// Mutable per-run state, only ever touched through [`Aggregator`].
///
/// Invariant at every observation point:
/// `attempts == successes + failures + inconclusive + errors`.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub attempts: u64,
    pub failures: u64,
    pub inconclusive: u64,
    pub errors: u64,
    pub results: Vec<CredentialPair>,
}

impl RunState {
    pub fn successes(&self) -> u64 {
        self.results.len() as u64
    }
}

/// Thread-safe accumulation of outcomes. The counters and the results list
/// update as a single atomic unit per attempt, and a found credential is
/// persisted to the optional sink before the lock is released, so partial
/// results survive a crash or interrupt.
pub struct Aggregator {
    inner: Mutex<Inner>,
}

struct Inner {
    state: RunState,
    sink: Option<ResultSink>,
}

impl Aggregator {
    pub fn new(sink_path: Option<&Path>) -> io::Result<Self> {
        let sink = match sink_path {
            Some(path) => Some(ResultSink::open(path)?),
            None => None,
        };
        Ok(Aggregator {
            inner: Mutex::new(Inner {
                state: RunState::default(),
                sink,
            }),
        })
    }

    /// Record one completed attempt. Logging stays outside the critical
    /// section; only the sink write happens under the lock.
    pub fn record(&self, pair: &CredentialPair, outcome: &AttemptOutcome) {
        let mut sink_result = Ok(());
        {
            let mut inner = self.inner.lock().unwrap();
            inner.state.attempts += 1;
            match outcome {
                AttemptOutcome::Success => {
                    inner.state.results.push(pair.clone());
                    if let Some(sink) = &mut inner.sink {
                        sink_result = sink.append(pair);
                    }
                }
                AttemptOutcome::Failure => inner.state.failures += 1,
                AttemptOutcome::Inconclusive => inner.state.inconclusive += 1,
                AttemptOutcome::Error(_) => inner.state.errors += 1,
            }
        }
        if let Err(e) = sink_result {
            error!("failed to persist {} to result sink: {}", pair, e);
        }
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> RunState {
        self.inner.lock().unwrap().state.clone()
    }
}
