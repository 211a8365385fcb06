//! evictkit: page-cache replacement policies and a hit-count simulator.
//!
//! Three policies share one `fetch(key, loader)` contract ([`traits::PageCache`]):
//! LRU, 2Q, and Belady's offline optimum. The [`sim`] module replays a request
//! workload against any of them and counts hits.

pub mod builder;
pub mod ds;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod sim;
pub mod traits;

pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::ds::{HashedQueue, ReferenceTrace};
pub use crate::traits::PageCache;
