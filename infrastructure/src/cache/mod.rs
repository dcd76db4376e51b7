//! Response cache adapters
//!
//! Both implement the [`ResponseCache`](consilium_application::ResponseCache)
//! port and read time from a [`Clock`](consilium_domain::Clock):
//!
//! - [`InMemoryResponseCache`]: `DashMap`, lives as long as the process
//! - [`FileResponseCache`]: one JSON file per key, survives restarts

mod file;
mod memory;

pub use file::FileResponseCache;
pub use memory::InMemoryResponseCache;
