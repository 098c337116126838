use folio_core::settings::error::StoreError;
use thiserror::Error;

/// # Summary
/// Failures surfaced to whoever issued a command.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// The loop is gone, nobody will answer.
    #[error("Monitor loop is not running")]
    Stopped,
}
