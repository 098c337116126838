//! # `folio-link` - station / access-point connectivity
//!
//! Owns the connectivity state machine. The monitor loop calls
//! [`manager::ConnectivityManager::tick`] every cadence; the manager itself
//! decides whether a check interval has elapsed.

pub mod manager;
pub mod transition;
