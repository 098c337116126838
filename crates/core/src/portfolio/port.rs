use crate::portfolio::entity::{PortfolioSnapshot, TrackingMode};
use crate::portfolio::error::FeedError;
use async_trait::async_trait;

/// # Summary
/// Fetch-on-demand source of portfolio snapshots.
///
/// # Invariants
/// - Implementations must be `Send + Sync` so the monitor future can be spawned.
/// - A fetch is bounded by the provider's own transport timeout.
/// - Any parse or transport error yields `Err`, never a partially filled
///   snapshot; the caller keeps its last good snapshot.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// # Summary
    /// Fetches the current snapshot for one tracking mode.
    ///
    /// # Logic
    /// 1. Refuse immediately when `online` is false.
    /// 2. Request the portfolio configured for `mode`.
    /// 3. Decode it into a bounded snapshot with fresh alert memory.
    ///
    /// # Arguments
    /// * `mode` - which portfolio to fetch.
    /// * `online` - station link state as seen by the caller.
    ///
    /// # Returns
    /// The snapshot, or the reason it is unavailable.
    async fn fetch(&self, mode: TrackingMode, online: bool) -> Result<PortfolioSnapshot, FeedError>;
}
