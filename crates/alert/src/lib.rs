//! # `folio-alert` - threshold evaluation over portfolio snapshots
//!
//! - [`engine`]: entry-mode P/L alerts with hysteresis and cooldown, exit-mode
//!   price-move alerts, latch reset.
//! - [`journal`]: bounded per-mode history of emitted alerts.

pub mod engine;
pub mod journal;
