// src/probe/http_form.rs
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use reqwest::{Client, Proxy, StatusCode};
use url::Url;

use crate::probe::{
    build_url, classify_http_error, AttemptError, AttemptOutcome, FormMethod, Probe,
    ProbeConfigError, ProbeOptions, USER_AGENT,
};

const DEFAULT_PATH: &str = "/login";

// Heuristic fallback tables, applied only when no explicit success/fail
// pattern resolves the response.
lazy_static! {
    static ref SUCCESS_BODY: Vec<Regex> = compile_all(&[
        r"welcome\s+(?:back\s+)?",
        r"dashboard",
        r"logout",
        r"sign\s*out",
        r"successfully\s+(?:logged\s+in|authenticated)",
        r"login\s+successful",
    ]);
    static ref FAILURE_BODY: Vec<Regex> = compile_all(&[
        r"invalid\s+(?:username|password|credentials|login)",
        r"(?:username|password)\s+(?:is\s+)?(?:incorrect|wrong|invalid)",
        r"authentication\s+failed",
        r"login\s+failed",
        r"access\s+denied",
        r"bad\s+(?:username|password|credentials)",
        r"try\s+again",
        r"please\s+check\s+your\s+(?:username|password|credentials)",
    ]);
    static ref LOGIN_FORM: Vec<Regex> = compile_all(&[
        r#"<input[^>]*type=["']password["']"#,
        r#"<form[^>]*(?:login|signin|auth)"#,
        r#"<input[^>]*name=["'](?:pass|password|pwd)["']"#,
    ]);
}

const SUCCESS_PATHS: &[&str] = &["/dashboard", "/admin", "/home", "/index", "/welcome", "/main"];
const FAILURE_PATHS: &[&str] = &["/login", "/signin", "/auth", "/error"];

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .expect("bundled heuristic pattern")
        })
        .collect()
}

/// HTTP form login probe.
///
/// Submits the credential fields with the configured method, follows
/// redirects, and classifies the final response: explicit fail pattern
/// first, then explicit success pattern, then the bundled heuristics, and
/// `Inconclusive` when nothing resolves.
pub struct HttpFormProbe {
    client: Client,
    path: String,
    port: Option<u16>,
    method: FormMethod,
    user_field: String,
    pass_field: String,
    success_re: Option<Regex>,
    fail_re: Option<Regex>,
}

impl HttpFormProbe {
    pub fn new(options: &ProbeOptions) -> Result<Self, ProbeConfigError> {
        let user_field = options
            .user_field
            .clone()
            .ok_or(ProbeConfigError::MissingFormField("--user-field"))?;
        let pass_field = options
            .pass_field
            .clone()
            .ok_or(ProbeConfigError::MissingFormField("--pass-field"))?;

        let mut builder = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(true)
            .user_agent(USER_AGENT)
            .cookie_store(true);
        if let Some(proxy) = &options.proxy {
            let proxy = Proxy::all(proxy).map_err(|source| ProbeConfigError::InvalidProxy {
                proxy: proxy.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(HttpFormProbe {
            client: builder.build()?,
            path: options
                .path
                .clone()
                .unwrap_or_else(|| DEFAULT_PATH.to_string()),
            port: options.port,
            method: options.method,
            user_field,
            pass_field,
            success_re: compile_option(&options.success_pattern, "success")?,
            fail_re: compile_option(&options.fail_pattern, "fail")?,
        })
    }
}

fn compile_option(
    pattern: &Option<String>,
    which: &'static str,
) -> Result<Option<Regex>, ProbeConfigError> {
    match pattern {
        None => Ok(None),
        Some(p) => RegexBuilder::new(p)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map(Some)
            .map_err(|source| ProbeConfigError::InvalidPattern {
                which,
                pattern: p.clone(),
                source,
            }),
    }
}

#[async_trait]
impl Probe for HttpFormProbe {
    async fn attempt(&self, target: &str, username: &str, password: &str) -> AttemptOutcome {
        match self.submit(target, username, password).await {
            Ok(outcome) => outcome,
            Err(err) => AttemptOutcome::Error(err),
        }
    }
}

impl HttpFormProbe {
    async fn submit(
        &self,
        target: &str,
        username: &str,
        password: &str,
    ) -> Result<AttemptOutcome, AttemptError> {
        let url = build_url(target, &self.path, self.port)?;
        let fields = [
            (self.user_field.as_str(), username),
            (self.pass_field.as_str(), password),
        ];

        let request = match self.method {
            FormMethod::Get => self.client.get(url.clone()).query(&fields),
            FormMethod::Post => self.client.post(url.clone()).form(&fields),
        };

        let response = request.send().await.map_err(|e| classify_http_error(&e))?;
        let status = response.status();
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_http_error(&e))?;

        if let Some(re) = &self.fail_re {
            if re.is_match(&body) {
                return Ok(AttemptOutcome::Failure);
            }
        }
        if let Some(re) = &self.success_re {
            if re.is_match(&body) {
                return Ok(AttemptOutcome::Success);
            }
        }

        Ok(analyze(status, &url, &final_url, &body))
    }
}

/// Heuristic fallback for responses with no explicit pattern hit.
fn analyze(status: StatusCode, original: &Url, final_url: &Url, body: &str) -> AttemptOutcome {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AttemptOutcome::Failure;
    }

    // Redirected away from the login page is a strong signal either way.
    if redirected(original, final_url) {
        let landing = final_url.path().to_ascii_lowercase();
        if SUCCESS_PATHS.iter().any(|p| landing.contains(p)) {
            return AttemptOutcome::Success;
        }
        if FAILURE_PATHS.iter().any(|p| landing.contains(p)) {
            return AttemptOutcome::Failure;
        }
        return AttemptOutcome::Success;
    }

    if SUCCESS_BODY.iter().any(|re| re.is_match(body)) {
        return AttemptOutcome::Success;
    }
    if FAILURE_BODY.iter().any(|re| re.is_match(body)) {
        return AttemptOutcome::Failure;
    }
    // Still looking at a login form means the attempt did not get through.
    if LOGIN_FORM.iter().any(|re| re.is_match(body)) {
        return AttemptOutcome::Failure;
    }

    AttemptOutcome::Inconclusive
}

fn redirected(original: &Url, final_url: &Url) -> bool {
    original.host_str() != final_url.host_str() || original.path() != final_url.path()
}
