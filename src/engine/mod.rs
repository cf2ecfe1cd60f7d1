// src/engine/mod.rs
//! The concurrent attempt-scheduling engine: credential source, shared
//! queue, worker pool, result aggregation, and the stop-on-success
//! shutdown protocol.

mod creds;
mod queue;
mod state;
mod stop;
mod worker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use log::{info, warn};
use serde::Serialize;
use tokio::time::timeout;

pub use creds::{CredentialPair, CredentialSource};
pub use queue::AttemptQueue;
pub use state::{Aggregator, RunState};
pub use stop::{StopHandle, StopSignal};

use crate::probe::{ProbeConfigError, ProbeFactory};

/// How long the supervisor waits for a worker to exit after a stop signal
/// before abandoning it. Attempts are not forcibly cancellable, so
/// stragglers are left to finish on their own, never force-killed.
const JOIN_GRACE: Duration = Duration::from_secs(2);

/// Random inter-attempt delay bounds (anti rate-limit jitter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

/// Immutable configuration snapshot for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target host, IP or URL, interpreted by the probe.
    pub target: String,
    /// Worker pool ceiling; the pool never exceeds the number of queued
    /// attempts and always has at least one worker.
    pub max_workers: usize,
    /// Hard per-attempt timeout.
    pub timeout: Duration,
    /// Halt the whole run as soon as any attempt succeeds.
    pub stop_on_success: bool,
    /// Optional per-attempt jitter.
    pub pacing: Option<Pacing>,
    /// Append-only `user:password` sink for found credentials.
    pub result_file: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(target: impl Into<String>) -> Self {
        RunConfig {
            target: target.into(),
            max_workers: 32,
            timeout: Duration::from_secs(5),
            stop_on_success: false,
            pacing: None,
            result_file: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("credential source is empty")]
    EmptySource,
    #[error("max_workers must be at least 1")]
    NoWorkers,
    #[error("invalid pacing bounds: min {min:?} exceeds max {max:?}")]
    InvalidPacing { min: Duration, max: Duration },
    #[error("probe configuration: {0}")]
    Probe(#[from] ProbeConfigError),
    #[error("result sink: {0}")]
    Sink(#[from] std::io::Error),
}

/// Final statistics of a run, returned as data so callers can assert on it.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub inconclusive: u64,
    pub errors: u64,
    pub duration_secs: f64,
    pub attempts_per_sec: f64,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub results: Vec<CredentialPair>,
}

/// Owns the lifecycle of one run: fills the queue from the credential
/// source, spawns the worker pool, waits for completion or cancellation,
/// and computes the final statistics. Not reusable for a second run.
pub struct Engine {
    config: RunConfig,
    source: CredentialSource,
    queue: Arc<AttemptQueue>,
    stop: Arc<StopSignal>,
    progress: Option<ProgressBar>,
}

impl Engine {
    pub fn new(config: RunConfig, source: CredentialSource) -> Result<Self, EngineError> {
        if source.is_empty() {
            return Err(EngineError::EmptySource);
        }
        if config.max_workers == 0 {
            return Err(EngineError::NoWorkers);
        }
        if let Some(pacing) = &config.pacing {
            if pacing.min > pacing.max {
                return Err(EngineError::InvalidPacing {
                    min: pacing.min,
                    max: pacing.max,
                });
            }
        }
        Ok(Engine {
            config,
            source,
            queue: Arc::new(AttemptQueue::new()),
            stop: Arc::new(StopSignal::new()),
            progress: None,
        })
    }

    /// Attach a progress bar fed one tick per completed attempt. Purely an
    /// observer; the engine contract does not depend on it.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Handle for external cancellation (operator interrupt). Cheap to
    /// clone into a signal handler task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: Arc::clone(&self.stop),
            queue: Arc::clone(&self.queue),
        }
    }

    /// Run to completion and return the report.
    pub async fn run(self, factory: &dyn ProbeFactory) -> Result<RunReport, EngineError> {
        let start = Instant::now();

        let mut queued: usize = 0;
        for pair in self.source.iter() {
            if self.stop.is_set() {
                break;
            }
            self.queue.push(pair);
            queued += 1;
        }
        self.queue.close();
        info!("queued {} credential attempts against {}", queued, self.config.target);

        let worker_count = self.config.max_workers.min(queued).max(1);

        // Probe construction errors (bad regex, bad proxy) are fatal and
        // surface here, before any worker starts.
        let mut probes = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            probes.push(factory.create()?);
        }

        let aggregator = Arc::new(Aggregator::new(self.config.result_file.as_deref())?);

        let mut handles = Vec::with_capacity(worker_count);
        for (id, probe) in probes.into_iter().enumerate() {
            let ctx = worker::WorkerContext {
                id,
                target: self.config.target.clone(),
                probe,
                queue: Arc::clone(&self.queue),
                stop: Arc::clone(&self.stop),
                aggregator: Arc::clone(&aggregator),
                timeout: self.config.timeout,
                stop_on_success: self.config.stop_on_success,
                pacing: self.config.pacing,
                progress: self.progress.clone(),
            };
            handles.push(tokio::spawn(worker::run(ctx)));
        }
        info!("started {} workers", worker_count);

        for (id, handle) in handles.into_iter().enumerate() {
            if self.stop.is_set() {
                // Bounded grace after a stop; a worker still inside an
                // attempt is abandoned and left to time out on its own.
                if timeout(JOIN_GRACE, handle).await.is_err() {
                    warn!("worker {} did not exit within grace period, abandoning", id);
                }
            } else {
                let _ = handle.await;
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        let state = aggregator.snapshot();
        let duration = start.elapsed();
        let duration_secs = duration.as_secs_f64();
        let summary = RunSummary {
            attempts: state.attempts,
            successes: state.successes(),
            failures: state.failures,
            inconclusive: state.inconclusive,
            errors: state.errors,
            duration_secs,
            attempts_per_sec: state.attempts as f64 / duration_secs.max(0.001),
        };
        info!(
            "run finished: {} attempts, {} valid, {} errors in {:.2}s ({:.2} attempts/s)",
            summary.attempts,
            summary.successes,
            summary.errors,
            summary.duration_secs,
            summary.attempts_per_sec
        );

        Ok(RunReport {
            summary,
            results: state.results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_source() {
        let source = CredentialSource::Pairs(Vec::new());
        assert!(matches!(
            Engine::new(RunConfig::new("host"), source),
            Err(EngineError::EmptySource)
        ));
    }

    #[test]
    fn rejects_zero_workers() {
        let source = CredentialSource::Pairs(vec![CredentialPair::new("a", "b")]);
        let mut config = RunConfig::new("host");
        config.max_workers = 0;
        assert!(matches!(
            Engine::new(config, source),
            Err(EngineError::NoWorkers)
        ));
    }

    #[test]
    fn rejects_inverted_pacing() {
        let source = CredentialSource::Pairs(vec![CredentialPair::new("a", "b")]);
        let mut config = RunConfig::new("host");
        config.pacing = Some(Pacing {
            min: Duration::from_millis(500),
            max: Duration::from_millis(100),
        });
        assert!(matches!(
            Engine::new(config, source),
            Err(EngineError::InvalidPacing { .. })
        ));
    }
}
