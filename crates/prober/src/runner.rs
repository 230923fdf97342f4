use chrono::Utc;
use pingboard_common::HostStatus;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::probe::{latency_millis, Probe};
use crate::report::StatusSink;

/// Outcome counts of one pass over the target list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub reported: usize,
    pub probe_failures: usize,
    pub report_failures: usize,
}

/// Probes every target in order, reports each success, then sleeps.
///
/// Hosts are handled one at a time, so a cycle takes the sum of all probe
/// and report durations and can outlast `interval`.
pub struct Prober<P, S> {
    probe: P,
    sink: S,
    targets: Vec<String>,
    interval: Duration,
}

impl<P: Probe, S: StatusSink> Prober<P, S> {
    pub fn new(probe: P, sink: S, targets: Vec<String>, interval: Duration) -> Self {
        Self {
            probe,
            sink,
            targets,
            interval,
        }
    }

    pub async fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for host in &self.targets {
            let rtt = match self.probe.probe(host).await {
                Ok(rtt) => rtt,
                Err(e) => {
                    warn!(host = %host, error = %e, "Error pinging host.");
                    summary.probe_failures += 1;
                    continue;
                }
            };

            let status = HostStatus::new(host.as_str(), latency_millis(rtt), Utc::now());
            match self.sink.report(&status).await {
                Ok(()) => {
                    info!(host = %host, ping_time = status.latency_millis, "Updated status.");
                    summary.reported += 1;
                }
                Err(e) => {
                    error!(host = %host, error = %e, "Error updating status.");
                    summary.report_failures += 1;
                }
            }
        }

        summary
    }

    /// Runs cycles until the task is dropped.
    pub async fn run(&self) {
        loop {
            let summary = self.run_cycle().await;
            info!(
                reported = summary.reported,
                probe_failures = summary.probe_failures,
                report_failures = summary.report_failures,
                "Probe cycle finished."
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
