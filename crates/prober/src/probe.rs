//! ICMP echo probing of a single host.
use async_trait::async_trait;
use rand::random;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError, ICMP};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Echo requests sent per probe.
pub const PROBE_COUNT: u16 = 3;
/// Upper bound for a whole probe, from first request to last reply.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Delay between consecutive echo requests.
pub const ECHO_SPACING: Duration = Duration::from_secs(1);

const PAYLOAD: [u8; 24] = [0; 24];

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },
    #[error("ICMP socket unavailable: {0}")]
    Socket(String),
    #[error("No echo replies from {host} ({last_error})")]
    NoReplies { host: String, last_error: String },
}

/// Measures round-trip time to a host.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Mean round-trip time over the replies received within the probe
    /// deadline. Zero replies is an error.
    async fn probe(&self, host: &str) -> Result<Duration, ProbeError>;
}

/// Arithmetic mean of the given round-trip times, `None` when empty.
pub fn mean_rtt(rtts: &[Duration]) -> Option<Duration> {
    if rtts.is_empty() {
        return None;
    }
    let total: Duration = rtts.iter().sum();
    Some(total / rtts.len() as u32)
}

/// Whole milliseconds, truncated and saturated to the stored column type.
pub fn latency_millis(rtt: Duration) -> i32 {
    i32::try_from(rtt.as_millis()).unwrap_or(i32::MAX)
}

/// Probe backed by `surge-ping`. One socket per address family is opened up
/// front and shared by every probe.
///
/// A `surge_ping::Client` shuts its socket down as soon as any clone of it is
/// dropped, so the clients here are never cloned; only `Pinger`s built from
/// them leave this struct.
pub struct IcmpProbe {
    v4: Result<Client, String>,
    v6: Result<Client, String>,
}

impl IcmpProbe {
    /// Opening a socket can fail for lack of privileges or IPv6 support.
    /// Such a failure only surfaces when a target of that family is probed.
    pub fn new() -> Self {
        let v4 = Client::new(&Config::default()).map_err(|e| e.to_string());
        let v6 = Client::new(&Config::builder().kind(ICMP::V6).build()).map_err(|e| e.to_string());

        if let Err(e) = &v4 {
            warn!(error = %e, "Failed to open ICMPv4 socket.");
        }
        if let Err(e) = &v6 {
            debug!(error = %e, "Failed to open ICMPv6 socket.");
        }

        Self { v4, v6 }
    }

    fn client_for(&self, addr: IpAddr) -> Result<&Client, ProbeError> {
        let client = match addr {
            IpAddr::V4(_) => &self.v4,
            IpAddr::V6(_) => &self.v6,
        };
        client.as_ref().map_err(|e| ProbeError::Socket(e.clone()))
    }
}

impl Default for IcmpProbe {
    fn default() -> Self {
        Self::new()
    }
}

async fn resolve(host: &str) -> Result<IpAddr, ProbeError> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(addr);
    }
    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| ProbeError::Resolve {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        })
}

#[async_trait]
impl Probe for IcmpProbe {
    async fn probe(&self, host: &str) -> Result<Duration, ProbeError> {
        let addr = resolve(host).await?;
        let client = self.client_for(addr)?;

        let started = Instant::now();
        let deadline = started + PROBE_TIMEOUT;
        let identifier = PingIdentifier(random());

        // Requests go out on a fixed schedule whether or not earlier ones
        // were answered; each waits for its reply until the shared deadline.
        let mut echoes = JoinSet::new();
        for seq in 0..PROBE_COUNT {
            let mut pinger = client.pinger(addr, identifier).await;
            echoes.spawn(async move {
                tokio::time::sleep_until(started + ECHO_SPACING * u32::from(seq)).await;
                pinger.timeout(deadline.saturating_duration_since(Instant::now()));
                pinger
                    .ping(PingSequence(seq), &PAYLOAD)
                    .await
                    .map(|(_reply, rtt)| rtt)
            });
        }

        let mut rtts = Vec::with_capacity(usize::from(PROBE_COUNT));
        let mut last_error: Option<SurgeError> = None;
        while let Some(joined) = echoes.join_next().await {
            match joined {
                Ok(Ok(rtt)) => rtts.push(rtt),
                Ok(Err(e)) => {
                    debug!(host = %host, error = %e, "Echo request failed.");
                    last_error = Some(e);
                }
                Err(e) => warn!(host = %host, error = %e, "Echo task aborted."),
            }
        }

        debug!(host = %host, replies = rtts.len(), "Probe finished.");
        mean_rtt(&rtts).ok_or_else(|| ProbeError::NoReplies {
            host: host.to_string(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "timed out".to_string()),
        })
    }
}
