use async_trait::async_trait;
use pingboard_common::HostStatus;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ReportError {
    /// The reporter could not be reached or the exchange broke off.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The reporter answered with something other than `201 Created`.
    #[error("Reporter rejected status with {0}")]
    Rejected(StatusCode),
}

/// Destination of probe results.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn report(&self, status: &HostStatus) -> Result<(), ReportError>;
}

/// Posts statuses as JSON to `{backend_url}/status`.
pub struct HttpStatusReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStatusReporter {
    pub fn new(backend_url: &str) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/status", backend_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatusSink for HttpStatusReporter {
    async fn report(&self, status: &HostStatus) -> Result<(), ReportError> {
        let response = self.client.post(&self.endpoint).json(status).send().await?;
        if response.status() != StatusCode::CREATED {
            return Err(ReportError::Rejected(response.status()));
        }
        Ok(())
    }
}
