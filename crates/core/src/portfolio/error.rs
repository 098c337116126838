use thiserror::Error;

/// # Summary
/// Reasons a snapshot fetch returns `Unavailable`.
///
/// # Invariants
/// - Any error means "no snapshot": providers never hand back partial data.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The caller reported no station link
    #[error("Not online")]
    Offline,
    /// Server or credentials missing from settings
    #[error("Feed not configured")]
    NotConfigured,
    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("Unexpected status: {0}")]
    Status(u16),
    /// Payload did not decode into a snapshot
    #[error("Parse error: {0}")]
    Parse(String),
    /// The provider answered with an explicit failure
    #[error("Platform error: {0}")]
    Platform(String),
    /// The fetch exceeded its time budget
    #[error("Fetch timed out")]
    Timeout,
}
