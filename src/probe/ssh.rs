// src/probe/ssh.rs
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use ssh2::Session;
use tokio::time::timeout;

use crate::probe::{AttemptError, AttemptOutcome, Probe, ProbeOptions};

const DEFAULT_PORT: u16 = 22;

/// SSH password authentication probe.
///
/// libssh2 is a blocking API, so the handshake and auth run inside
/// `spawn_blocking` with the worker's hard timeout wrapped around the join.
pub struct SshProbe {
    port: u16,
    timeout: Duration,
}

impl SshProbe {
    pub fn new(options: &ProbeOptions) -> Self {
        SshProbe {
            port: options.port.unwrap_or(DEFAULT_PORT),
            timeout: options.timeout,
        }
    }
}

#[async_trait]
impl Probe for SshProbe {
    async fn attempt(&self, target: &str, username: &str, password: &str) -> AttemptOutcome {
        let addr = format!("{}:{}", target, self.port);
        let limit = self.timeout;
        let user = username.to_string();
        let pass = password.to_string();

        let join = tokio::task::spawn_blocking(move || ssh_login(&addr, &user, &pass, limit));
        match timeout(limit, join).await {
            Ok(Ok(Ok(outcome))) => outcome,
            Ok(Ok(Err(err))) => AttemptOutcome::Error(err),
            Ok(Err(join_err)) => AttemptOutcome::Error(AttemptError::Unexpected(join_err.to_string())),
            Err(_) => AttemptOutcome::Error(AttemptError::Timeout),
        }
    }
}

fn ssh_login(
    addr: &str,
    username: &str,
    password: &str,
    limit: Duration,
) -> Result<AttemptOutcome, AttemptError> {
    let sock_addr = addr
        .to_socket_addrs()
        .map_err(|e| AttemptError::Connection(format!("cannot resolve {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| AttemptError::Connection(format!("no address for {}", addr)))?;

    let tcp = TcpStream::connect_timeout(&sock_addr, limit)
        .map_err(|e| AttemptError::Connection(e.to_string()))?;

    let mut session =
        Session::new().map_err(|e| AttemptError::Unexpected(e.to_string()))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(limit.as_millis() as u32);

    session
        .handshake()
        .map_err(|e| AttemptError::Protocol(format!("ssh handshake failed: {}", e)))?;

    // After a clean handshake an auth error means rejected credentials.
    match session.userauth_password(username, password) {
        Ok(()) => Ok(AttemptOutcome::Success),
        Err(e) => {
            debug!("ssh auth rejected on {}: {}", addr, e);
            Ok(AttemptOutcome::Failure)
        }
    }
}
