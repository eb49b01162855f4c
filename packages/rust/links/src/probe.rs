//! Concurrent link probes.
//!
//! One HEAD request per target with a short timeout and no retry. A failing
//! probe never cancels its siblings.

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use inkpress_shared::{InkpressError, LinkCheckConfig, Result};

use crate::extract::probe_targets;

const USER_AGENT: &str = concat!("inkpress/", env!("CARGO_PKG_VERSION"));

/// Why one link is considered broken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkFailure {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Probe outcome for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    pub url: Url,
    /// Final status code after redirects, or the failure.
    pub outcome: std::result::Result<u16, LinkFailure>,
}

impl LinkStatus {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Probes hyperlink targets for existence.
#[derive(Debug, Clone)]
pub struct LinkChecker {
    client: Client,
    probe_timeout: Duration,
    max_concurrent: usize,
}

impl LinkChecker {
    pub fn new(config: &LinkCheckConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(config.probe_timeout)
            .build()
            .map_err(|e| InkpressError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            probe_timeout: config.probe_timeout,
            max_concurrent: config.max_concurrent.max(1),
        })
    }

    /// Extract the probeable links of `body` and probe them all.
    pub async fn check(&self, body: &str) -> Vec<LinkStatus> {
        let targets = probe_targets(body);
        if targets.is_empty() {
            debug!("no external links to probe");
            return Vec::new();
        }
        self.probe_all(targets).await
    }

    /// Probe every target; results are in input order.
    #[instrument(skip_all, fields(links = targets.len()))]
    pub async fn probe_all(&self, targets: Vec<Url>) -> Vec<LinkStatus> {
        let start = Instant::now();

        let statuses: Vec<LinkStatus> = stream::iter(targets)
            .map(|url| async move {
                let outcome = self.probe(&url).await;
                LinkStatus { url, outcome }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let broken = statuses.iter().filter(|s| !s.is_ok()).count();
        info!(
            probed = statuses.len(),
            broken,
            duration_ms = start.elapsed().as_millis(),
            "link check completed"
        );
        statuses
    }

    /// HEAD one target. 4xx and 5xx count as broken.
    pub async fn probe(&self, url: &Url) -> std::result::Result<u16, LinkFailure> {
        let outcome = match self.client.head(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    Err(LinkFailure::Status(status.as_u16()))
                } else {
                    Ok(status.as_u16())
                }
            }
            Err(e) if e.is_timeout() => Err(LinkFailure::Timeout(self.probe_timeout)),
            Err(e) => Err(LinkFailure::Request(e.to_string())),
        };

        match &outcome {
            Ok(code) => debug!(%url, status = code, "link ok"),
            Err(e) => warn!(%url, error = %e, "broken link"),
        }
        outcome
    }
}
