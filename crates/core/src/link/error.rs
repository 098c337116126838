use thiserror::Error;

/// Connectivity state machine errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// The transition table has no entry for this state and input
    #[error("Illegal link transition from {from} on {input}")]
    IllegalTransition { from: String, input: String },
}
