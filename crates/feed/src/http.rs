use async_trait::async_trait;
use folio_core::portfolio::entity::{POSITION_CAPACITY, PortfolioSnapshot, TrackingMode};
use folio_core::portfolio::error::FeedError;
use folio_core::portfolio::port::SnapshotProvider;
use folio_core::settings::entity::FeedSettings;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::parse::parse_snapshot;

/// Transport timeout of one portfolio request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// # Summary
/// Snapshot provider backed by the portfolio server's device endpoint.
///
/// # Invariants
/// - Uses one pooled `reqwest` client; every request carries HTTP basic auth.
/// - Only `200 OK` responses are decoded.
#[derive(Clone)]
pub struct HttpSnapshotProvider {
    client: Client,
    feed: FeedSettings,
    capacity: usize,
}

impl HttpSnapshotProvider {
    /// # Summary
    /// Builds a provider for the given feed settings.
    ///
    /// # Arguments
    /// * `feed` - server, credentials and portfolio names.
    /// * `timeout` - per-request transport timeout.
    ///
    /// # Returns
    /// The provider, or `FeedError::Network` when the client cannot be built
    /// (for instance when no TLS crypto provider is installed).
    pub fn new(feed: FeedSettings, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(Self {
            client,
            feed,
            capacity: POSITION_CAPACITY,
        })
    }

    /// Overrides the snapshot capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn feed(&self) -> &FeedSettings {
        &self.feed
    }

    fn portfolio_name(&self, mode: TrackingMode) -> &str {
        match mode {
            TrackingMode::Entry => &self.feed.entry_portfolio,
            TrackingMode::Exit => &self.feed.exit_portfolio,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/device/portfolio/{}",
            self.feed.server.trim_end_matches('/'),
            self.feed.username
        )
    }
}

fn transport_error(e: reqwest::Error) -> FeedError {
    if e.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::Network(e.to_string())
    }
}

#[async_trait]
impl SnapshotProvider for HttpSnapshotProvider {
    /// # Summary
    /// Fetches one portfolio from the server.
    ///
    /// # Logic
    /// 1. Offline or unconfigured: fail without touching the network.
    /// 2. `GET {server}/api/device/portfolio/{username}?portfolio_name=...`.
    /// 3. Anything but `200 OK` is `FeedError::Status`.
    /// 4. Decode the body with `parse_snapshot`.
    async fn fetch(&self, mode: TrackingMode, online: bool) -> Result<PortfolioSnapshot, FeedError> {
        if !online {
            return Err(FeedError::Offline);
        }
        if !self.feed.is_configured() {
            return Err(FeedError::NotConfigured);
        }

        let portfolio = self.portfolio_name(mode);
        debug!(%mode, portfolio, "Fetching portfolio");

        let resp = self
            .client
            .get(self.endpoint())
            .query(&[("portfolio_name", portfolio)])
            .basic_auth(&self.feed.username, Some(&self.feed.password))
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(%mode, portfolio, status = status.as_u16(), "Portfolio request rejected");
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(transport_error)?;
        let snapshot = parse_snapshot(&body, self.capacity)?;
        debug!(
            %mode,
            positions = snapshot.len(),
            truncated = snapshot.truncated(),
            bytes = body.len(),
            "Portfolio fetched"
        );
        Ok(snapshot)
    }
}
