// src/probe/http_basic.rs
use reqwest::{redirect, Client, Proxy, StatusCode};

use async_trait::async_trait;
use log::debug;

use crate::probe::{
    build_url, classify_http_error, AttemptOutcome, Probe, ProbeConfigError, ProbeOptions,
    USER_AGENT,
};

/// HTTP Basic authentication probe.
///
/// The initial request never follows redirects so the status code can be
/// read as-is; a 3xx answer is retried once through a redirect-following
/// client and judged by where it lands.
pub struct HttpBasicProbe {
    client: Client,
    redirect_client: Client,
    path: String,
    port: Option<u16>,
    forbidden_as_success: bool,
}

impl HttpBasicProbe {
    pub fn new(options: &ProbeOptions) -> Result<Self, ProbeConfigError> {
        let client = build_client(options, redirect::Policy::none())?;
        let redirect_client = build_client(options, redirect::Policy::limited(10))?;
        Ok(HttpBasicProbe {
            client,
            redirect_client,
            path: options.path.clone().unwrap_or_else(|| "/".to_string()),
            port: options.port,
            forbidden_as_success: options.forbidden_as_success,
        })
    }
}

fn build_client(
    options: &ProbeOptions,
    policy: redirect::Policy,
) -> Result<Client, ProbeConfigError> {
    let mut builder = Client::builder()
        .timeout(options.timeout)
        .danger_accept_invalid_certs(true)
        .user_agent(USER_AGENT)
        .redirect(policy);
    if let Some(proxy) = &options.proxy {
        let proxy = Proxy::all(proxy).map_err(|source| ProbeConfigError::InvalidProxy {
            proxy: proxy.clone(),
            source,
        })?;
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}

#[async_trait]
impl Probe for HttpBasicProbe {
    async fn attempt(&self, target: &str, username: &str, password: &str) -> AttemptOutcome {
        let url = match build_url(target, &self.path, self.port) {
            Ok(url) => url,
            Err(err) => return AttemptOutcome::Error(err),
        };

        let response = match self
            .client
            .get(url.clone())
            .basic_auth(username, Some(password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Error(classify_http_error(&e)),
        };

        match response.status() {
            StatusCode::OK => AttemptOutcome::Success,
            StatusCode::UNAUTHORIZED => AttemptOutcome::Failure,
            StatusCode::FORBIDDEN => {
                if self.forbidden_as_success {
                    AttemptOutcome::Success
                } else {
                    AttemptOutcome::Failure
                }
            }
            status if status.is_redirection() => {
                // Follow the redirect with auth attached; a landing page
                // other than 401 indicates the credentials were accepted.
                match self
                    .redirect_client
                    .get(url)
                    .basic_auth(username, Some(password))
                    .send()
                    .await
                {
                    Ok(landed) if landed.status() == StatusCode::UNAUTHORIZED => {
                        AttemptOutcome::Failure
                    }
                    Ok(_) => AttemptOutcome::Success,
                    Err(e) => AttemptOutcome::Error(classify_http_error(&e)),
                }
            }
            status => {
                debug!("http-basic: treating status {} as failure", status);
                AttemptOutcome::Failure
            }
        }
    }
}
