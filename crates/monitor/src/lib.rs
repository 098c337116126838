//! The single cooperative monitoring loop.
//!
//! [`context::Monitor`] owns every piece of mutable state and runs one tick
//! at a time; [`runtime`] drives it on a tokio interval and feeds it external
//! commands between ticks.

pub mod command;
pub mod context;
pub mod error;
pub mod report;
pub mod runtime;
pub mod stats;
