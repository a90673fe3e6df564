//! TCP liveness probe and best-effort HTTP fetch.

use crate::types::ProbeResult;
use async_trait::async_trait;
use common::{Error, Result};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default bound on resolution and on each connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default bound on the whole HTTP fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Prober trait
///
/// `connect` decides liveness. `fetch` is diagnostic only: its result never
/// changes what gets persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    /// Open (and immediately close) a TCP connection to `host:port`
    async fn connect(&self, host: &str, port: u16) -> ProbeResult;

    /// GET `resource` and discard the body
    async fn fetch(&self, resource: &str) -> ProbeResult;
}

/// Prober backed by tokio sockets and a reqwest client
pub struct NetProber {
    connect_timeout: Duration,
    client: reqwest::Client,
}

impl NetProber {
    /// Create a new prober with the given bounds
    pub fn new(connect_timeout: Duration, fetch_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| Error::probe(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            connect_timeout,
            client,
        })
    }

    async fn resolve(&self, host: &str, port: u16) -> std::result::Result<Vec<SocketAddr>, ProbeResult> {
        let start = Instant::now();

        match timeout(self.connect_timeout, lookup_host((host, port))).await {
            Ok(Ok(addrs)) => {
                let addrs: Vec<SocketAddr> = addrs.collect();
                if addrs.is_empty() {
                    Err(ProbeResult::error(start.elapsed(), "No addresses resolved"))
                } else {
                    Ok(addrs)
                }
            }
            Ok(Err(e)) => Err(ProbeResult::error(
                start.elapsed(),
                format!("Resolution failed: {}", e),
            )),
            Err(_) => Err(ProbeResult::timeout(start.elapsed())),
        }
    }
}

#[async_trait]
impl Prober for NetProber {
    async fn connect(&self, host: &str, port: u16) -> ProbeResult {
        let start = Instant::now();

        let addrs = match self.resolve(host, port).await {
            Ok(addrs) => addrs,
            Err(result) => {
                warn!(host, port, message = result.message.as_deref().unwrap_or("unknown"), "Resolution failed");
                return result;
            }
        };

        let mut last_failure = None;
        for addr in addrs {
            match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => {
                    let duration = start.elapsed();
                    debug!(host, %addr, duration_ms = duration.as_millis(), "TCP connect successful");
                    return ProbeResult::reachable(duration);
                }
                Ok(Err(e)) => {
                    debug!(host, %addr, error = %e, "TCP connect failed, trying next address");
                    last_failure = Some(ProbeResult::unreachable(
                        start.elapsed(),
                        format!("Connection failed: {}", e),
                    ));
                }
                Err(_) => {
                    debug!(host, %addr, "TCP connect timed out, trying next address");
                    last_failure = Some(ProbeResult::timeout(start.elapsed()));
                }
            }
        }

        let result = last_failure
            .unwrap_or_else(|| ProbeResult::error(start.elapsed(), "No addresses resolved"));
        warn!(host, port, status = %result.status, "TCP probe failed");
        result
    }

    async fn fetch(&self, resource: &str) -> ProbeResult {
        let start = Instant::now();

        match self.client.get(resource).send().await {
            Ok(response) => {
                let status = response.status();
                let code = status.as_u16();

                if !(status.is_success() || status.is_redirection()) {
                    return ProbeResult::unreachable(
                        start.elapsed(),
                        format!("Unexpected status code: {}", code),
                    )
                    .with_response_code(code);
                }

                match response.bytes().await {
                    Ok(body) => {
                        let duration = start.elapsed();
                        debug!(url = resource, status = code, bytes = body.len(), duration_ms = duration.as_millis(),
                               "HTTP fetch successful");
                        ProbeResult::reachable(duration).with_response_code(code)
                    }
                    Err(e) => ProbeResult::error(start.elapsed(), format!("Failed to read body: {}", e))
                        .with_response_code(code),
                }
            }
            Err(e) if e.is_timeout() => ProbeResult::timeout(start.elapsed()),
            Err(e) => ProbeResult::error(start.elapsed(), format!("HTTP request failed: {}", e)),
        }
    }
}
