// src/probe/mod.rs
//! Protocol probes: one authentication attempt per call, classified into a
//! fixed outcome taxonomy. A probe never lets a library error escape its
//! boundary; every failure mode maps to [`AttemptOutcome`].

pub mod ftp;
pub mod http_basic;
pub mod http_form;
pub mod ssh;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

pub use ftp::FtpProbe;
pub use http_basic::HttpBasicProbe;
pub use http_form::HttpFormProbe;
pub use ssh::SshProbe;

/// Outcome of a single credential attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The service accepted the credentials.
    Success,
    /// The service rejected the credentials (protocol-confirmed).
    Failure,
    /// Heuristic response analysis could not decide (HTTP form only).
    Inconclusive,
    /// The attempt could not be carried out.
    Error(AttemptError),
}

/// Failure modes that are not a credential verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("attempt timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Protocol selector for the probe built by [`ProbeSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProbeKind {
    Ssh,
    Ftp,
    HttpBasic,
    HttpForm,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::Ssh => "ssh",
            ProbeKind::Ftp => "ftp",
            ProbeKind::HttpBasic => "http-basic",
            ProbeKind::HttpForm => "http-form",
        };
        f.write_str(name)
    }
}

/// HTTP method used by the form probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FormMethod {
    Get,
    #[default]
    Post,
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormMethod::Get => "get",
            FormMethod::Post => "post",
        })
    }
}

/// Options shared by all probe kinds; protocol-specific fields are ignored
/// by probes that do not use them.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Per-attempt timeout, also the hard bound enforced by the worker.
    pub timeout: Duration,
    /// Port override; each probe has its own default (22, 21, URL port).
    pub port: Option<u16>,
    /// URL path for the HTTP probes.
    pub path: Option<String>,
    /// HTTP proxy URL.
    pub proxy: Option<String>,
    /// Form submission method (http-form).
    pub method: FormMethod,
    /// Form username field name (http-form, required).
    pub user_field: Option<String>,
    /// Form password field name (http-form, required).
    pub pass_field: Option<String>,
    /// Regex marking a successful login response (http-form).
    pub success_pattern: Option<String>,
    /// Regex marking a failed login response (http-form, checked first).
    pub fail_pattern: Option<String>,
    /// Treat HTTP 403 as authenticated (http-basic). 403 commonly means
    /// "authenticated but forbidden", so this stays opt-in.
    pub forbidden_as_success: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            timeout: Duration::from_secs(5),
            port: None,
            path: None,
            proxy: None,
            method: FormMethod::Post,
            user_field: None,
            pass_field: None,
            success_pattern: None,
            fail_pattern: None,
            forbidden_as_success: false,
        }
    }
}

/// Configuration errors surfaced before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum ProbeConfigError {
    #[error("invalid {which} pattern '{pattern}': {source}")]
    InvalidPattern {
        which: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid proxy url '{proxy}': {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http-form probe requires {0}")]
    MissingFormField(&'static str),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// One authentication attempt against a target.
///
/// Implementations must be safe to construct in parallel and must not share
/// mutable state across instances; each worker owns exactly one probe so
/// connection or session reuse stays worker-local.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn attempt(&self, target: &str, username: &str, password: &str) -> AttemptOutcome;
}

/// Builds one probe instance per worker.
pub trait ProbeFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Probe>, ProbeConfigError>;
}

/// Probe selection plus its options; the standard [`ProbeFactory`].
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    pub kind: ProbeKind,
    pub options: ProbeOptions,
}

impl ProbeFactory for ProbeSpec {
    fn create(&self) -> Result<Box<dyn Probe>, ProbeConfigError> {
        let probe: Box<dyn Probe> = match self.kind {
            ProbeKind::Ssh => Box::new(SshProbe::new(&self.options)),
            ProbeKind::Ftp => Box::new(FtpProbe::new(&self.options)),
            ProbeKind::HttpBasic => Box::new(HttpBasicProbe::new(&self.options)?),
            ProbeKind::HttpForm => Box::new(HttpFormProbe::new(&self.options)?),
        };
        Ok(probe)
    }
}

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Build the request URL for the HTTP probes: default to `http://` when the
/// target carries no scheme, apply the port override, join the path.
pub(crate) fn build_url(target: &str, path: &str, port: Option<u16>) -> Result<Url, AttemptError> {
    let base = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    };

    let mut url = Url::parse(&base)
        .map_err(|e| AttemptError::Protocol(format!("invalid target url '{}': {}", target, e)))?;
    if let Some(port) = port {
        url.set_port(Some(port))
            .map_err(|_| AttemptError::Protocol(format!("cannot set port on '{}'", target)))?;
    }
    url.join(path)
        .map_err(|e| AttemptError::Protocol(format!("invalid path '{}': {}", path, e)))
}

/// Map a reqwest error into the fixed taxonomy.
pub(crate) fn classify_http_error(err: &reqwest::Error) -> AttemptError {
    if err.is_timeout() {
        AttemptError::Timeout
    } else if err.is_connect() {
        AttemptError::Connection(err.to_string())
    } else if err.is_decode() || err.is_redirect() {
        AttemptError::Protocol(err.to_string())
    } else {
        AttemptError::Unexpected(err.to_string())
    }
}
