//! Response cache values: task fingerprints, per-agent keys and entries.
//!
//! Storage lives behind the `ResponseCache` port in the application layer.

pub mod entry;
pub mod fingerprint;

pub use entry::CacheEntry;
pub use fingerprint::{CacheKey, Fingerprint};
