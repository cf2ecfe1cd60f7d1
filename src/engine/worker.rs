// src/engine/worker.rs
use std::sync::Arc;
use std::time::Duration;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rand::Rng;
use tokio::time::timeout;

use crate::engine::queue::AttemptQueue;
use crate::engine::state::Aggregator;
use crate::engine::stop::StopSignal;
use crate::engine::Pacing;
use crate::probe::{AttemptError, AttemptOutcome, Probe};

/// Upper bound on a single queue wait, so a worker blocked on an empty
/// queue re-checks the stop signal about once a second.
pub(crate) const POP_WAIT: Duration = Duration::from_secs(1);

pub(crate) struct WorkerContext {
    pub id: usize,
    pub target: String,
    pub probe: Box<dyn Probe>,
    pub queue: Arc<AttemptQueue>,
    pub stop: Arc<StopSignal>,
    pub aggregator: Arc<Aggregator>,
    pub timeout: Duration,
    pub stop_on_success: bool,
    pub pacing: Option<Pacing>,
    pub progress: Option<ProgressBar>,
}

/// Worker loop: dequeue, optionally pace, probe under a hard timeout,
/// report. Exits when the queue is exhausted or the stop signal is set.
pub(crate) async fn run(ctx: WorkerContext) {
    debug!("worker {} started", ctx.id);

    while !ctx.stop.is_set() {
        let Some(pair) = ctx.queue.pop(POP_WAIT).await else {
            break;
        };
        // The pair may have been dequeued just as the run was stopped;
        // stopping means no new attempts are started.
        if ctx.stop.is_set() {
            break;
        }

        if let Some(pacing) = &ctx.pacing {
            tokio::time::sleep(pacing.sample()).await;
        }

        let outcome = match timeout(
            ctx.timeout,
            ctx.probe.attempt(&ctx.target, &pair.username, &pair.password),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => AttemptOutcome::Error(AttemptError::Timeout),
        };

        ctx.aggregator.record(&pair, &outcome);

        match &outcome {
            AttemptOutcome::Success => {
                info!("worker {}: VALID {}", ctx.id, pair);
                if ctx.stop_on_success && ctx.stop.set() {
                    info!("stop-on-success: halting the run");
                    ctx.queue.drain();
                }
            }
            AttemptOutcome::Failure => debug!("worker {}: invalid {}", ctx.id, pair),
            AttemptOutcome::Inconclusive => {
                warn!("worker {}: inconclusive response for {}", ctx.id, pair)
            }
            AttemptOutcome::Error(err) => warn!("worker {}: {} -> {}", ctx.id, pair, err),
        }

        if let Some(pb) = &ctx.progress {
            pb.inc(1);
        }
    }

    debug!("worker {} finished", ctx.id);
}

impl Pacing {
    /// Per-attempt jitter drawn uniformly from `[min, max]`. This is not a
    /// global rate limiter; in the limit throughput is workers divided by
    /// the average delay.
    pub(crate) fn sample(&self) -> Duration {
        let min = self.min.as_secs_f64();
        let max = self.max.as_secs_f64();
        let secs = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_sample_stays_in_bounds() {
        let pacing = Pacing {
            min: Duration::from_millis(100),
            max: Duration::from_millis(300),
        };
        for _ in 0..200 {
            let d = pacing.sample();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(300));
        }
    }

    #[test]
    fn degenerate_pacing_is_exact() {
        let pacing = Pacing {
            min: Duration::from_millis(200),
            max: Duration::from_millis(200),
        };
        assert_eq!(pacing.sample(), Duration::from_millis(200));
    }
}
