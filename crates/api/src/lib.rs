//! # `folio-api` - HTTP control surface
//!
//! JSON endpoints over the monitor's command channel, documented with
//! `utoipa` and served with a Swagger UI.
//!
//! ## Responsibilities
//! - Translate requests into monitor commands and wait for their outcome
//! - Serve the last published status report
//! - Map command failures onto HTTP status codes

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
