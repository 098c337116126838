//! Portfolio snapshot providers.
//!
//! `http` talks to the portfolio server; `parse` turns its JSON payload into
//! a bounded [`folio_core::portfolio::entity::PortfolioSnapshot`].

pub mod http;
pub mod parse;
