//! Replay a request workload against a policy and count hits.
//!
//! A workload is plain text: whitespace-separated integers giving the cache
//! capacity, the number of requests, then the requested keys.
//!
//! ```text
//!   4 12
//!   1 2 3 4 1 2 5 1 2 4 3 4
//!   ^ ^  └────────────────── keys
//!   │ └── request count
//!   └──── capacity (<= 0 is clamped by the caches)
//! ```
//!
//! Every key is loaded with the identity loader, so a report's `loads` is the
//! number of misses the policy chose to admit.
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::CachePolicy;
//! use evictkit::sim::{Workload, simulate};
//!
//! let workload: Workload = "4 12 1 2 3 4 1 2 5 1 2 4 3 4".parse().unwrap();
//! let report = simulate(CachePolicy::Lru, &workload).unwrap();
//! assert_eq!(report.to_string(), "Hits = 6");
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::builder::{CacheBuilder, CachePolicy};
use crate::error::{ConfigError, ParseError};

/// A parsed simulation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub capacity: usize,
    pub requests: Vec<i64>,
}

impl Workload {
    /// Parses `capacity count key...` from whitespace-separated text.
    ///
    /// Tokens after the declared number of requests are ignored.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut tokens = input.split_whitespace().enumerate();
        let mut next_int = |what: &str| -> Result<(usize, i64), ParseError> {
            let (idx, token) = tokens.next().ok_or_else(|| {
                ParseError::new(format!("unexpected end of input, expected {what}"))
            })?;
            let value = token.parse::<i64>().map_err(|_| {
                ParseError::at_token(idx, format!("expected {what}, found `{token}`"))
            })?;
            Ok((idx, value))
        };

        let (_, capacity) = next_int("a capacity")?;
        let (count_idx, count) = next_int("a request count")?;
        let count = usize::try_from(count).map_err(|_| {
            ParseError::at_token(count_idx, format!("request count must be >= 0, got {count}"))
        })?;

        let mut requests = Vec::with_capacity(count.min(input.len() / 2 + 1));
        for _ in 0..count {
            let (_, key) = next_int("a key")?;
            requests.push(key);
        }

        Ok(Self {
            capacity: usize::try_from(capacity).unwrap_or(0),
            requests,
        })
    }
}

impl FromStr for Workload {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workload::parse(s)
    }
}

/// Outcome of one replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimReport {
    pub policy: CachePolicy,
    /// Capacity the cache actually used after clamping.
    pub capacity: usize,
    pub requests: usize,
    pub hits: usize,
    pub misses: usize,
    /// Loader calls; below `misses` when the policy bypassed some keys.
    pub loads: usize,
}

impl SimReport {
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hits = {}", self.hits)
    }
}

/// Replays `workload` against a fresh cache of the given policy.
///
/// The ideal policy is given the workload's requests as its trace.
pub fn simulate(policy: CachePolicy, workload: &Workload) -> Result<SimReport, ConfigError> {
    let mut cache = CacheBuilder::new(workload.capacity)
        .trace(workload.requests.clone())
        .build::<i64, i64>(policy)?;

    let mut hits = 0;
    let mut loads = 0;
    for &key in &workload.requests {
        let hit = cache.fetch(key, |k| {
            loads += 1;
            *k
        });
        if hit {
            hits += 1;
        }
    }

    let report = SimReport {
        policy,
        capacity: cache.capacity(),
        requests: workload.requests.len(),
        hits,
        misses: workload.requests.len() - hits,
        loads,
    };
    debug!(
        %policy,
        requests = report.requests,
        hits = report.hits,
        loads = report.loads,
        "simulation finished"
    );
    Ok(report)
}
