//! Cache Module
//!
//! Provides the get-or-compute cache, its entries and the two enumeration
//! modes over its contents.

mod entry;
mod enumerate;
mod handle;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::Entry;
pub use enumerate::{Entries, FanOut, FanOutReport};
pub use handle::{Cache, GetOptions};
pub use stats::CacheStats;

pub(crate) use handle::Shared;
pub(crate) use store::Store;
