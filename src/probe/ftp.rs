// src/probe/ftp.rs
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::probe::{AttemptError, AttemptOutcome, Probe, ProbeOptions};

const DEFAULT_PORT: u16 = 21;

/// FTP login probe speaking the control channel directly: read the `220`
/// greeting, send `USER`/`PASS`, classify the reply codes.
pub struct FtpProbe {
    port: u16,
    timeout: Duration,
}

impl FtpProbe {
    pub fn new(options: &ProbeOptions) -> Self {
        FtpProbe {
            port: options.port.unwrap_or(DEFAULT_PORT),
            timeout: options.timeout,
        }
    }

    async fn login(
        &self,
        addr: &str,
        username: &str,
        password: &str,
    ) -> Result<AttemptOutcome, AttemptError> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| AttemptError::Connection(e.to_string()))?;

        let greeting = read_reply(&mut stream).await?;
        match reply_code(&greeting) {
            Some(220) => {}
            Some(421) => {
                return Err(AttemptError::Connection("421 service not available".into()))
            }
            _ => {
                return Err(AttemptError::Protocol(format!(
                    "unexpected greeting: {}",
                    first_line(&greeting)
                )))
            }
        }

        send(&mut stream, &format!("USER {}\r\n", username)).await?;
        let reply = read_reply(&mut stream).await?;
        match reply_code(&reply) {
            // Some servers accept the user without a password.
            Some(230) => {
                let _ = send(&mut stream, "QUIT\r\n").await;
                return Ok(AttemptOutcome::Success);
            }
            Some(331) | Some(332) => {}
            Some(530) => return Ok(AttemptOutcome::Failure),
            Some(421) => return Err(AttemptError::Connection("421 service not available".into())),
            _ => {
                return Err(AttemptError::Protocol(format!(
                    "unexpected USER reply: {}",
                    first_line(&reply)
                )))
            }
        }

        send(&mut stream, &format!("PASS {}\r\n", password)).await?;
        let reply = read_reply(&mut stream).await?;
        let outcome = match reply_code(&reply) {
            Some(230) | Some(202) => {
                let _ = send(&mut stream, "QUIT\r\n").await;
                Ok(AttemptOutcome::Success)
            }
            Some(530) | Some(430) | Some(501) => Ok(AttemptOutcome::Failure),
            Some(421) => Err(AttemptError::Connection("421 service not available".into())),
            _ => Err(AttemptError::Protocol(format!(
                "unexpected PASS reply: {}",
                first_line(&reply)
            ))),
        };
        outcome
    }
}

#[async_trait]
impl Probe for FtpProbe {
    async fn attempt(&self, target: &str, username: &str, password: &str) -> AttemptOutcome {
        let addr = format!("{}:{}", target, self.port);
        match timeout(self.timeout, self.login(&addr, username, password)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => AttemptOutcome::Error(err),
            Err(_) => AttemptOutcome::Error(AttemptError::Timeout),
        }
    }
}

async fn send(stream: &mut TcpStream, command: &str) -> Result<(), AttemptError> {
    stream
        .write_all(command.as_bytes())
        .await
        .map_err(|e| AttemptError::Connection(e.to_string()))
}

async fn read_reply(stream: &mut TcpStream) -> Result<String, AttemptError> {
    let mut buffer = vec![0u8; 1024];
    let n = stream
        .read(&mut buffer)
        .await
        .map_err(|e| AttemptError::Connection(e.to_string()))?;
    if n == 0 {
        return Err(AttemptError::Connection("connection closed by server".into()));
    }
    Ok(String::from_utf8_lossy(&buffer[..n]).into_owned())
}

fn reply_code(reply: &str) -> Option<u16> {
    reply.get(..3)?.parse().ok()
}

fn first_line(reply: &str) -> &str {
    reply.lines().next().unwrap_or("").trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reply_codes() {
        assert_eq!(reply_code("230 Login successful.\r\n"), Some(230));
        assert_eq!(reply_code("530-Auth failed\r\n530 End\r\n"), Some(530));
        assert_eq!(reply_code("ga"), None);
        assert_eq!(reply_code("garbage"), None);
    }

    #[test]
    fn first_line_trims() {
        assert_eq!(first_line("220 ProFTPD ready\r\n220 more\r\n"), "220 ProFTPD ready");
        assert_eq!(first_line(""), "");
    }
}
