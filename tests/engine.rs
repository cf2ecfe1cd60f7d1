// tests/engine.rs
//! End-to-end engine runs with scripted probes standing in for the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use demi_rs::{
    AttemptError, AttemptOutcome, CredentialPair, CredentialSource, Engine, EngineError, Pacing,
    Probe, ProbeConfigError, ProbeFactory, RunConfig,
};

type Script = Arc<dyn Fn(&str, &str) -> AttemptOutcome + Send + Sync>;

struct ScriptedProbe {
    script: Script,
    delay: Option<Duration>,
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn attempt(&self, _target: &str, username: &str, password: &str) -> AttemptOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.script)(username, password)
    }
}

struct ScriptedFactory {
    script: Script,
    delay: Option<Duration>,
}

impl ScriptedFactory {
    fn new(script: impl Fn(&str, &str) -> AttemptOutcome + Send + Sync + 'static) -> Self {
        ScriptedFactory {
            script: Arc::new(script),
            delay: None,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl ProbeFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn Probe>, ProbeConfigError> {
        Ok(Box::new(ScriptedProbe {
            script: Arc::clone(&self.script),
            delay: self.delay,
        }))
    }
}

fn product(users: usize, passwords: usize) -> CredentialSource {
    CredentialSource::Product {
        users: (0..users).map(|i| format!("user{}", i)).collect(),
        passwords: (0..passwords).map(|i| format!("pass{}", i)).collect(),
    }
}

fn config(workers: usize) -> RunConfig {
    let mut config = RunConfig::new("testhost");
    config.max_workers = workers;
    config.timeout = Duration::from_secs(5);
    config
}

fn assert_invariant(summary: &demi_rs::RunSummary) {
    assert_eq!(
        summary.attempts,
        summary.successes + summary.failures + summary.inconclusive + summary.errors,
        "counter invariant violated: {:?}",
        summary
    );
}

#[tokio::test]
async fn full_cross_product_is_attempted() {
    let factory = ScriptedFactory::new(|_, _| AttemptOutcome::Failure);
    let engine = Engine::new(config(8), product(4, 5)).unwrap();
    let run = engine.run(&factory).await.unwrap();

    assert_eq!(run.summary.attempts, 20);
    assert_eq!(run.summary.failures, 20);
    assert!(run.results.is_empty());
    assert_invariant(&run.summary);
}

#[tokio::test]
async fn stop_on_success_halts_early_and_reports_the_hit() {
    let factory = ScriptedFactory::new(|user, pass| {
        if user == "user3" && pass == "pass4" {
            AttemptOutcome::Success
        } else {
            AttemptOutcome::Failure
        }
    });
    let mut config = config(4);
    config.stop_on_success = true;

    let engine = Engine::new(config, product(8, 8)).unwrap();
    let run = engine.run(&factory).await.unwrap();

    assert!(run
        .results
        .contains(&CredentialPair::new("user3", "pass4")));
    assert!(run.summary.successes >= 1);
    assert!(run.summary.attempts <= 64);
    assert_invariant(&run.summary);
}

#[tokio::test]
async fn erroring_probe_never_kills_the_pool() {
    let factory = ScriptedFactory::new(|_, _| {
        AttemptOutcome::Error(AttemptError::Unexpected("boom".into()))
    });
    let engine = Engine::new(config(8), product(3, 4)).unwrap();
    let run = engine.run(&factory).await.unwrap();

    assert_eq!(run.summary.errors, 12);
    assert_eq!(run.summary.attempts, 12);
    assert!(run.results.is_empty());
    assert_invariant(&run.summary);
}

#[tokio::test]
async fn invariant_holds_for_any_interleaving() {
    for workers in [1, 2, 7, 16, 64] {
        let factory = ScriptedFactory::new(|user: &str, pass: &str| {
            match (user.len() + pass.len() * 3) % 4 {
                0 => AttemptOutcome::Success,
                1 => AttemptOutcome::Failure,
                2 => AttemptOutcome::Inconclusive,
                _ => AttemptOutcome::Error(AttemptError::Connection("refused".into())),
            }
        });
        let engine = Engine::new(config(workers), product(12, 9)).unwrap();
        let run = engine.run(&factory).await.unwrap();

        assert_eq!(run.summary.attempts, 108, "workers={}", workers);
        assert_eq!(run.summary.successes as usize, run.results.len());
        assert_invariant(&run.summary);
    }
}

#[tokio::test]
async fn successes_are_persisted_uncorrupted() {
    let dir = tempfile::tempdir().unwrap();
    let sink = dir.path().join("found.txt");

    let factory = ScriptedFactory::new(|user, pass| {
        if (user == "user0" && pass == "pass1") || (user == "user2" && pass == "pass0") {
            AttemptOutcome::Success
        } else {
            AttemptOutcome::Failure
        }
    });
    let mut config = config(4);
    config.result_file = Some(sink.clone());

    let engine = Engine::new(config, product(3, 3)).unwrap();
    let run = engine.run(&factory).await.unwrap();
    assert_eq!(run.summary.successes, 2);

    let written = std::fs::read_to_string(&sink).unwrap();
    let mut lines: Vec<&str> = written.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["user0:pass1", "user2:pass0"]);
}

#[tokio::test]
async fn pacing_delays_every_attempt() {
    let factory = ScriptedFactory::new(|_, _| AttemptOutcome::Failure);
    let mut config = config(1);
    config.pacing = Some(Pacing {
        min: Duration::from_millis(200),
        max: Duration::from_millis(200),
    });

    let engine = Engine::new(
        config,
        CredentialSource::Pairs(vec![
            CredentialPair::new("a", "1"),
            CredentialPair::new("a", "2"),
            CredentialPair::new("a", "3"),
        ]),
    )
    .unwrap();
    let run = engine.run(&factory).await.unwrap();

    assert_eq!(run.summary.attempts, 3);
    assert!(
        run.summary.duration_secs >= 0.6,
        "expected at least 0.6s of pacing, got {:.3}s",
        run.summary.duration_secs
    );
}

#[tokio::test]
async fn hanging_probe_is_cut_off_and_counted_as_error() {
    let factory = ScriptedFactory::new(|_, _| AttemptOutcome::Success)
        .with_delay(Duration::from_secs(30));
    let mut config = config(2);
    config.timeout = Duration::from_millis(200);

    let engine = Engine::new(
        config,
        CredentialSource::Pairs(vec![
            CredentialPair::new("a", "1"),
            CredentialPair::new("b", "2"),
        ]),
    )
    .unwrap();
    let run = engine.run(&factory).await.unwrap();

    assert_eq!(run.summary.attempts, 2);
    assert_eq!(run.summary.errors, 2);
    assert!(run.results.is_empty());
    assert_invariant(&run.summary);
}

#[tokio::test]
async fn external_stop_prevents_new_attempts() {
    let factory = ScriptedFactory::new(|_, _| AttemptOutcome::Failure)
        .with_delay(Duration::from_millis(50));
    let engine = Engine::new(config(2), product(20, 20)).unwrap();
    let stop = engine.stop_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        stop.trigger();
    });

    let run = engine.run(&factory).await.unwrap();
    assert!(run.summary.attempts < 400);
    assert_invariant(&run.summary);
}

#[test]
fn empty_source_is_a_fatal_setup_error() {
    let source = CredentialSource::Product {
        users: vec!["admin".into()],
        passwords: vec![],
    };
    assert!(matches!(
        Engine::new(RunConfig::new("testhost"), source),
        Err(EngineError::EmptySource)
    ));
}

#[tokio::test]
async fn single_attempt_still_gets_a_worker() {
    let factory = ScriptedFactory::new(|_, _| AttemptOutcome::Success);
    let engine = Engine::new(
        config(64),
        CredentialSource::Pairs(vec![CredentialPair::new("admin", "admin")]),
    )
    .unwrap();
    let run = engine.run(&factory).await.unwrap();

    assert_eq!(run.summary.attempts, 1);
    assert_eq!(run.results, vec![CredentialPair::new("admin", "admin")]);
}
