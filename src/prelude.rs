pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::error::{ConfigError, InvariantError, ParseError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
pub use crate::policy::ideal::IdealCache;
pub use crate::policy::lru::LruStore;
pub use crate::policy::two_q::{TwoQTier, TwoQueueCache};
pub use crate::sim::{SimReport, Workload, simulate};
pub use crate::traits::PageCache;
