use thiserror::Error;

/// # Summary
/// Failures of a `ConfigStore` write.
///
/// # Invariants
/// - Reads never fail: an unreadable store falls back to defaults.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file or device I/O failed, nothing was committed
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// The settings record could not be encoded
    #[error("Serialize error: {0}")]
    Serialize(String),

    /// The requested change violates a settings invariant
    #[error("Invalid settings change: {0}")]
    Invalid(String),
}
