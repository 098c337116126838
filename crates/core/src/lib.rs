//! # `folio-core` - domain model and ports
//!
//! Entities, port traits and error enums shared by every other crate.
//! Nothing in here performs I/O; adapters live in sibling crates and are
//! wired together by `folio-app`.
//!
//! ## Layout
//! - `settings`: device settings and the `ConfigStore` port
//! - `link`: connectivity states and the `Radio` port
//! - `portfolio`: positions, snapshots and the `SnapshotProvider` port
//! - `alert`: alert events produced by the engine
//! - `notify`: output-channel ports (audible, indicator, visual)

pub mod alert;
pub mod common;
pub mod config;
pub mod link;
pub mod notify;
pub mod portfolio;
pub mod settings;

#[cfg(feature = "test-utils")]
pub mod test_utils;
