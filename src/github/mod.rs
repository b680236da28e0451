//! GitHub contents API client.
//!
//! Knows nothing about documents or caching — only raw files: directory
//! listing, single-file read, and create-or-update with an optional blob
//! sha for optimistic concurrency.

pub mod client;
pub mod types;
