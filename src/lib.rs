// src/lib.rs
//! # demi-rs
//!
//! `demi-rs` drives authorized credential-testing campaigns against a single
//! network service (SSH, FTP, HTTP Basic auth, HTTP form login) by trying
//! username/password combinations and reporting which ones succeed.
//!
//! The crate is split into the concurrent attempt-scheduling engine
//! ([`engine`]) and the protocol probes ([`probe`]). The engine materializes
//! a credential stream into a shared FIFO, drains it with a fixed pool of
//! workers, aggregates outcomes under a single lock, and supports a
//! stop-on-success shutdown protocol plus optional per-attempt jitter.
//!
//! ## Usage
//!
//! ```text
//! # SSH with separate wordlists
//! demi-rs -m ssh -t 192.168.1.10 -U users.txt -P passwords.txt
//!
//! # FTP with user:pass pairs, stop at the first hit
//! demi-rs -m ftp -t 192.168.1.10 --pairs combos.txt -f
//!
//! # HTTP form login with explicit outcome patterns
//! demi-rs -m http-form -t http://example.com --path /login \
//!     --user-field username --pass-field password \
//!     --fail-re "invalid password" -U users.txt -P passwords.txt
//! ```
//!
//! Programmatic use goes through [`Engine`]: build a [`RunConfig`] and a
//! [`CredentialSource`], hand the engine a [`ProbeFactory`], and assert on
//! the returned [`RunReport`].

pub mod cli;
pub mod common;
pub mod engine;
pub mod output;
pub mod probe;

pub use engine::{
    CredentialPair, CredentialSource, Engine, EngineError, Pacing, RunConfig, RunReport, RunState,
    RunSummary,
};
pub use probe::{
    AttemptError, AttemptOutcome, FormMethod, Probe, ProbeConfigError, ProbeFactory, ProbeKind,
    ProbeOptions, ProbeSpec,
};
