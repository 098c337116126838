//! # `folio-store` - settings persistence
//!
//! `ConfigStore` adapters: [`memory::MemoryConfigStore`] for tests and hosts
//! without storage, [`json::JsonConfigStore`] for a JSON file under the data
//! directory.

pub mod json;
pub mod memory;
