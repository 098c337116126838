//! # `folio-notify` - alert and status presentation
//!
//! - [`dispatcher`]: arbitration of the active alert slot and every command
//!   sent to the audible, indicator and visual channels.
//! - [`tone`]: motif selection and volume shaping.
//! - [`console`]: log-backed channels for hosts without output hardware.

pub mod console;
pub mod dispatcher;
pub mod tone;
