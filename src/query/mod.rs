//! Query cache for PokéAPI requests
//!
//! This module provides a cache keyed by request identity that deduplicates
//! concurrent fetches, keeps results for reuse, and publishes status changes
//! to every subscriber of a key.

mod cache;
mod fetcher;
mod key;
mod state;

pub use cache::{QueryCache, QueryConfig, Subscription, DEFAULT_KEEP_UNUSED_FOR};
pub use fetcher::{FetchFuture, Fetcher};
#[cfg(test)]
pub(crate) use fetcher::stub;
pub use key::{QueryData, QueryKey};
pub use state::{QueryError, QuerySnapshot, QueryStatus};
