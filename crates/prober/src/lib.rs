pub mod config;
pub mod probe;
pub mod report;
pub mod runner;

pub use config::ProberConfig;
pub use probe::{IcmpProbe, Probe, ProbeError};
pub use report::{HttpStatusReporter, ReportError, StatusSink};
pub use runner::{CycleSummary, Prober};
